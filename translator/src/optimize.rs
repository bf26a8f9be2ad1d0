use crate::Node;

/// Rewrites every `x` immediately followed by `x*` into `x+`, in a single
/// left to right pass over sibling nodes.
pub(crate) fn collapse_repeats(nodes: Vec<Node>) -> Vec<Node> {
    let mut collapsed: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Star(body) if collapsed.last() == Some(&*body) => {
                collapsed.pop();
                collapsed.push(Node::Plus(body));
            }
            node => collapsed.push(node),
        }
    }
    collapsed
}
