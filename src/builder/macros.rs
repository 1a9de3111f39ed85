//! Macros for ergonomic graph construction.

/// Build a [`StateGraph`](crate::graph::StateGraph) from `name => handler`
/// pairs. Handlers are anything convertible into a
/// [`StateHandler`](crate::graph::StateHandler).
///
/// # Example
///
/// ```
/// use waypoint::builder::RulesBuilder;
/// use waypoint::state_graph;
///
/// let graph = state_graph! {
///     "foo" => "bar",
///     "bar" => ["foo", "baz"],
///     "baz" => RulesBuilder::new().always("foo"),
/// };
///
/// assert_eq!(graph.len(), 3);
/// ```
#[macro_export]
macro_rules! state_graph {
    ($($name:expr => $handler:expr),* $(,)?) => {
        $crate::graph::StateGraph::new()
            $(.with($name, $handler))*
    };
}
