/// Result signal of an asynchronous SDK query, as the view sees it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Fetch<T> {
    /// Not requested (e.g. a wallet-scoped query with no wallet).
    #[default]
    Idle,
    /// In flight with nothing to show yet.
    Loading,
    /// In flight again; the previous value stays readable for display.
    Refreshing(T),
    Ready(T),
    Failed(String),
}

impl<T> Fetch<T> {
    /// True only while there is no value to show.
    pub fn is_loading(&self) -> bool {
        matches!(self, Fetch::Loading)
    }

    /// True for any query in flight, including a refresh over a kept value.
    pub fn is_fetching(&self) -> bool {
        matches!(self, Fetch::Loading | Fetch::Refreshing(_))
    }

    /// Settled successfully and not being re-queried.
    pub fn is_success(&self) -> bool {
        matches!(self, Fetch::Ready(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Fetch::Failed(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Fetch::Ready(v) | Fetch::Refreshing(v) => Some(v),
            _ => None,
        }
    }

    /// Mark a query as in flight. A previous value moves to `Refreshing`.
    pub fn begin(&mut self) {
        *self = match std::mem::replace(self, Fetch::Idle) {
            Fetch::Ready(v) | Fetch::Refreshing(v) => Fetch::Refreshing(v),
            _ => Fetch::Loading,
        };
    }

    pub fn settle<E: ToString>(&mut self, result: Result<T, E>) {
        *self = match result {
            Ok(v) => Fetch::Ready(v),
            Err(e) => Fetch::Failed(e.to_string()),
        };
    }
}
