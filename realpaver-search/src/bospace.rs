//! [`BoSpace`]: a priority structure for branch-and-bound over a scalar
//! objective. Selects by lowest lower bound most of the time, and by
//! lowest upper bound every `frequency`-th extraction, so the search
//! periodically chases the incumbent instead of only widening the
//! frontier. Standalone: nothing in [`crate::driver::Driver`] wires this
//! in, since bound optimization is not part of the NCSP search loop.

/// A node carrying the lower/upper bound of an objective over some
/// region, plus an opaque payload the caller attaches (typically an
/// [`crate::node::NcspNode`] and the interval evaluation of the
/// objective over its box).
#[derive(Debug, Clone)]
pub struct BoNode<T> {
    pub lower: f64,
    pub upper: f64,
    pub payload: T,
}

struct Item<T> {
    id: u64,
    node: BoNode<T>,
}

/// Kept as a flat, unsorted vector rather than the two parallel
/// multisets of the source: this scaffold is unwired and not on any hot
/// path, so an `O(n)` scan per extraction trades the source's `O(log n)`
/// for simplicity.
pub struct BoSpace<T> {
    items: Vec<Item<T>>,
    next_id: u64,
    extractions: u64,
    frequency: u64,
    node_count: u64,
}

impl<T> BoSpace<T> {
    pub fn new(frequency: u64) -> Self {
        assert!(frequency >= 1, "frequency must be at least 1");
        BoSpace { items: Vec::new(), next_id: 0, extractions: 0, frequency, node_count: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: u64) {
        assert!(frequency >= 1, "frequency must be at least 1");
        self.frequency = frequency;
    }

    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    pub fn get_lowest_lower_bound(&self) -> Option<f64> {
        self.items.iter().map(|i| i.node.lower).fold(None, |acc, x| Some(acc.map_or(x, |a: f64| a.min(x))))
    }

    pub fn get_lowest_upper_bound(&self) -> Option<f64> {
        self.items.iter().map(|i| i.node.upper).fold(None, |acc, x| Some(acc.map_or(x, |a: f64| a.min(x))))
    }

    pub fn insert_node(&mut self, node: BoNode<T>) {
        self.node_count += 1;
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Item { id, node });
    }

    fn remove_by_id(&mut self, id: u64) -> Option<BoNode<T>> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos).node)
    }

    /// Extracts by lowest lower bound, except every `frequency`-th
    /// extraction, which takes the lowest upper bound instead.
    /// `frequency == 1` always takes the lowest lower bound.
    pub fn extract_node(&mut self) -> Option<BoNode<T>> {
        if self.items.is_empty() {
            return None;
        }
        self.extractions += 1;
        let by_upper = self.frequency != 1 && self.extractions % self.frequency == 0;
        let id = if by_upper {
            self.items.iter().min_by(|a, b| a.node.upper.partial_cmp(&b.node.upper).unwrap_or(std::cmp::Ordering::Equal)).map(|i| i.id)
        } else {
            self.items.iter().min_by(|a, b| a.node.lower.partial_cmp(&b.node.lower).unwrap_or(std::cmp::Ordering::Equal)).map(|i| i.id)
        }?;
        self.remove_by_id(id)
    }

    /// Drops every node whose lower bound exceeds `u`, an upper bound on
    /// the minimum found so far: such a node cannot contain a better
    /// solution.
    pub fn simplify(&mut self, u: f64) {
        self.items.retain(|i| i.node.lower <= u);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_alternates_to_upper_bound_every_frequency_th_pull() {
        let mut space = BoSpace::new(2);
        space.insert_node(BoNode { lower: 1.0, upper: 10.0, payload: "a" });
        space.insert_node(BoNode { lower: 2.0, upper: 3.0, payload: "b" });
        let first = space.extract_node().unwrap();
        assert_eq!(first.payload, "a");
        let second = space.extract_node().unwrap();
        assert_eq!(second.payload, "b");
    }

    #[test]
    fn simplify_drops_nodes_whose_lower_bound_exceeds_u() {
        let mut space = BoSpace::new(1);
        space.insert_node(BoNode { lower: 1.0, upper: 5.0, payload: 1 });
        space.insert_node(BoNode { lower: 9.0, upper: 20.0, payload: 2 });
        space.simplify(5.0);
        assert_eq!(space.get_lowest_lower_bound(), Some(1.0));
        let remaining: Vec<_> = std::iter::from_fn(|| space.extract_node()).collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].payload, 1);
    }
}
