/// Assigns group names to runs of equal consecutive values while a list is
/// rendered, cycling through `groups` at every change of value.
///
/// Rendering must visit elements in order starting from index 0, which
/// resets the cycle.
#[derive(Debug, Clone)]
pub struct ListGroupingController<G> {
    groups: Vec<String>,
    group_index: usize,
    previous: Option<G>,
}

impl<G: PartialEq + Clone> ListGroupingController<G> {
    pub fn new(groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            groups: groups.into_iter().map(Into::into).collect(),
            group_index: 0,
            previous: None,
        }
    }

    /// Group of the element at `index`. `None` if no groups were given.
    pub fn group(&mut self, index: usize, value: &G) -> Option<&str> {
        if self.groups.is_empty() {
            return None;
        }
        if index == 0 {
            self.group_index = 0;
            self.previous = Some(value.clone());
        } else if self.previous.as_ref() != Some(value) {
            self.group_index = (self.group_index + 1) % self.groups.len();
            self.previous = Some(value.clone());
        }
        self.groups.get(self.group_index).map(String::as_str)
    }
}
