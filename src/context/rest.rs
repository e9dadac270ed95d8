use crate::KelpValue;

/// The trailing arguments of a variadic host function, already converted to
/// `T`.
pub struct Rest<T> {
    values: Vec<T>,
}

impl<T> Rest<T> {
    pub fn new(values: Vec<T>) -> Self {
        Rest { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}

impl<T> std::ops::Deref for Rest<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<T> IntoIterator for Rest<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<T> FromIterator<T> for Rest<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Rest::new(iter.into_iter().collect())
    }
}

impl From<Rest<KelpValue>> for KelpValue {
    fn from(rest: Rest<KelpValue>) -> Self {
        rest.values.into_iter().collect()
    }
}
