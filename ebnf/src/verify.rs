use crate::Expression;
use crate::Grammar;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Start production '{0}' not found")]
    MissingStart(String),
    #[error("Production '{production}' refers to undefined production '{missing}'")]
    Undefined { production: String, missing: String },
    #[error("Production '{production}' is unreachable from '{start}'")]
    Unreachable { production: String, start: String },
}

impl Grammar {
    /// Checks that `start` exists, that every referenced name is defined and
    /// that every production can be reached from `start`.
    pub fn verify(&self, start: &str) -> Result<(), VerifyError> {
        let Some(root) = self.get(start) else {
            return Err(VerifyError::MissingStart(start.to_string()));
        };

        for production in self.iter() {
            let mut names = Vec::new();
            production.expr.collect_names(&mut names);
            if let Some(missing) = names.into_iter().find(|name| self.get(name).is_none()) {
                return Err(VerifyError::Undefined {
                    production: production.name.clone(),
                    missing: missing.to_string(),
                });
            }
        }

        let mut reached = BTreeSet::from([root.name.as_str()]);
        let mut pending = vec![&root.expr];
        while let Some(expr) = pending.pop() {
            let mut names = Vec::new();
            expr.collect_names(&mut names);
            for name in names {
                if let Some(production) = self.get(name)
                    && reached.insert(production.name.as_str())
                {
                    pending.push(&production.expr);
                }
            }
        }

        match self.iter().find(|p| !reached.contains(p.name.as_str())) {
            Some(production) => Err(VerifyError::Unreachable {
                production: production.name.clone(),
                start: start.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Expression {
    fn collect_names<'e>(&'e self, names: &mut Vec<&'e str>) {
        match self {
            Expression::Name(name) => names.push(name),
            Expression::Range { .. } | Expression::Literal(_) => {}
            Expression::Sequence(items) | Expression::Alternative(items) => {
                for item in items {
                    item.collect_names(names);
                }
            }
            Expression::Repetition(body)
            | Expression::Option(body)
            | Expression::Group(body)
            | Expression::Complement(body) => body.collect_names(names),
        }
    }
}
