/**
Provides a lisp-like syntax for constructing lists.

## Example

```rust
use kelp::{list, KelpValue, Error};

fn main() -> Result<(), Error> {
    // Create a list with 3 values inside.
    let list1 = list!(
        ,10.into()
        ,"hello".into()
        ,5.2.into()
    )?;
    assert_eq!(
        list1.to_write_string(),
        r#"(10 "hello" 5.2)"#
    );

    // Create a list that splices `list1` in the second pos.
    let list2 = list!(
        ,20.into()
        ,@list1.clone()
        ,list1
        ,"world".into()
    )?;
    assert_eq!(
        list2.to_write_string(),
        r#"(20 10 "hello" 5.2 (10 "hello" 5.2) "world")"#
    );

    Ok(())
}
```
*/
#[macro_export]
macro_rules! list {
    (@push $ret:ident, @ $item:expr) => {
        $crate::list_to_vec(&$item).map(|items| $ret.extend(items))
    };
    (@push $ret:ident, $item:expr) => {
        Ok::<(), $crate::Error>($ret.push($item))
    };
    (@push $ret:ident, @ $item:expr, $($items:tt)+) => {
        $crate::list!(@push $ret, @ $item).and_then(|_| $crate::list!(@push $ret, $($items)+))
    };
    (@push $ret:ident, $item:expr, $($items:tt)+) => {
        $crate::list!(@push $ret, $item).and_then(|_| $crate::list!(@push $ret, $($items)+))
    };
    (, $($items:tt)+) => { $crate::list!($($items)+) };
    ($($items:tt)+) => {{
        let mut ret: Vec<$crate::KelpValue> = Vec::new();
        $crate::list!(@push ret, $($items)+)
            .map(|_| ret.into_iter().collect::<$crate::KelpValue>())
    }};
    () => { Ok::<_, $crate::Error>($crate::KelpValue::EmptyList) }
}

/**
Destructures a special form and binds the components to separate variables.

Missing required elements and extra elements are syntax errors.

## Example

```rust
use kelp::{destruct_bind, list, KelpValue, Error};

fn main() -> Result<(), Error> {
    let list1 = list!(,10.into())?;
    destruct_bind!((num1 &optional str1 num2) = list1);

    assert_eq!(num1.as_int()?, 10);
    assert!(str1.is_void());
    assert!(num2.is_void());

    let list1 = list!(
        ,10.into()
        ,"hello".into()
        ,5.2.into()
        ,22.into()
        ,42.into()
    )?;
    destruct_bind!((num1 &optional str1 num2 &rest other) = list1);

    assert_eq!(num1.as_int()?, 10);
    assert_eq!(&*str1.as_string()?, "hello");
    assert_eq!(num2.as_float()?, 5.2);
    assert_eq!(other.to_string(), "(22 42)");

    Ok(())
}
 ```
*/
#[macro_export]
macro_rules! destruct_bind {
    (@reqr $vv:ident, $var:ident) => {
        let $var = match &$vv {
            $crate::KelpValue::Pair(pair) => pair.first(),
            _ => return Err($crate::Error::syntax_error(
                concat!("missing ", stringify!($var), " in form")
            )),
        };
        let $vv = $vv.cdr()?;
    };
    (@reqr $vv:ident, $var:ident $($vars:tt)+) => {
        $crate::destruct_bind!(@reqr $vv, $var);
        $crate::destruct_bind!(@reqr $vv, $($vars)+);
    };
    (@reqr $vv:ident,) => {};
    (@no-rest $vv:ident) => {
        if !$vv.null() {
            return Err($crate::Error::syntax_error("too many elements in form"));
        }
    };
    (@rest $rest:ident $vv:ident) => {
        let $rest = $vv;
    };
    (@optvar $vv:ident, $var:ident) => {
        let ($var, $vv) = if $vv.consp() {
            ($vv.car()?, $vv.cdr()?)
        } else {
            ($crate::KelpValue::Void, $vv)
        };
    };
    (@optvar $vv:ident, $var:ident $($vars:ident)+) => {
        $crate::destruct_bind!(@optvar $vv, $var);
        $crate::destruct_bind!(@optvar $vv, $($vars)+)
    };
    (@impl ($($vars:ident)+) = $vv:ident) => {
        $crate::destruct_bind!(@reqr $vv, $($vars)+);
        $crate::destruct_bind!(@no-rest $vv);
    };
    (@impl ($($vars:ident)* &optional $($optvars:ident)+) = $vv:ident) => {
        $crate::destruct_bind!(@reqr $vv, $($vars)*);
        $crate::destruct_bind!(@optvar $vv, $($optvars)+);
        $crate::destruct_bind!(@no-rest $vv);
    };
    (@impl ($($vars:ident)* &rest $rest:ident) = $vv:ident) => {
        $crate::destruct_bind!(@reqr $vv, $($vars)*);
        $crate::destruct_bind!(@rest $rest $vv);
    };
    (@impl ($($vars:ident)* &optional $($optvars:ident)+ &rest $rest:ident) = $vv:ident) => {
        $crate::destruct_bind!(@reqr $vv, $($vars)*);
        $crate::destruct_bind!(@optvar $vv, $($optvars)+);
        $crate::destruct_bind!(@rest $rest $vv);
    };
    (($($rest:tt)*) = $vv:ident) => {
        $crate::destruct_bind!(@impl ($($rest)*) = $vv);
    };
}
