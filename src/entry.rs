/// A key-value pair stored in a node.
pub struct Entry<T, U> {
    pub key: T,
    pub value: U,
}

impl<T, U> Entry<T, U> {
    pub fn as_pair(&self) -> (&T, &U) {
        (&self.key, &self.value)
    }
}
