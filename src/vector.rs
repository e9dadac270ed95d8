use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::{Error, KelpValue};

/// A fixed-length, mutable sequence of values.  Clones share storage.
#[derive(Clone)]
pub struct Vector(Rc<RefCell<Vec<KelpValue>>>);

impl Vector {
    pub fn new(items: Vec<KelpValue>) -> Self {
        Vector(Rc::new(RefCell::new(items)))
    }

    pub fn filled(length: usize, fill: KelpValue) -> Self {
        Self::new(vec![fill; length])
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> Ref<'_, Vec<KelpValue>> {
        self.0.borrow()
    }

    fn check_index(&self, index: i64, length: usize) -> Result<usize, Error> {
        match usize::try_from(index) {
            Ok(index) if index < length => Ok(index),
            _ => Err(Error::lisp_error(format!("invalid index ({})", index))),
        }
    }

    pub fn get(&self, index: i64) -> Result<KelpValue, Error> {
        let index = self.check_index(index, self.len())?;
        Ok(self.0.borrow()[index].clone())
    }

    pub fn set(&self, index: i64, value: KelpValue) -> Result<(), Error> {
        let index = self.check_index(index, self.len())?;
        self.0.borrow_mut()[index] = value;
        Ok(())
    }

    /// A fresh vector holding the elements in `[start, end)`.
    pub fn slice(&self, start: i64, end: i64) -> Result<Vector, Error> {
        let length = self.len();
        let start = self.check_index(start, length + 1)?;
        let end = self.check_index(end, length + 1)?;
        if start > end {
            return Err(Error::lisp_error(format!("invalid index ({})", end)));
        }
        Ok(Vector::new(self.0.borrow()[start..end].to_vec()))
    }

    pub fn to_list(&self) -> KelpValue {
        self.0.borrow().iter().cloned().collect()
    }

    pub fn ptr_eq(&self, other: &Vector) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl From<Vector> for KelpValue {
    fn from(value: Vector) -> Self {
        KelpValue::Vector(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let vector = Vector::new(vec![1.into(), 2.into(), 3.into()]);
        assert_eq!(vector.get(2).unwrap().to_string(), "3");
        assert_eq!(
            vector.get(3).unwrap_err().to_string(),
            "error: invalid index (3)"
        );
        assert_eq!(
            vector.set(-1, KelpValue::Void).unwrap_err().to_string(),
            "error: invalid index (-1)"
        );
    }

    #[test]
    fn test_slice() {
        let vector = Vector::new(vec![1.into(), 2.into(), 3.into()]);
        assert_eq!(vector.slice(1, 3).unwrap().to_list().to_string(), "(2 3)");
        assert!(vector.slice(3, 3).unwrap().is_empty());
        assert!(vector.slice(2, 1).is_err());
        assert!(vector.slice(0, 4).is_err());
    }
}
