//! Operator-impl boilerplate for single-field newtypes.

/// Implements the standard arithmetic operator traits for a tuple newtype wrapping a numeric type.
///
/// * `op!(binary Foo, Add, add)` implements `Add` for `Foo`.
/// * `op!(inplace Foo, AddAssign, add_assign)` implements `AddAssign` for `Foo`.
/// * `op!(unary Foo, Neg, neg)` implements `Neg` for `Foo`.
#[macro_export]
macro_rules! op {
    (binary $type:ty, $trait:ident, $method:ident) => {
        impl $trait for $type {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(self.0.$method(rhs.0))
            }
        }
    };
    (inplace $type:ty, $trait:ident, $method:ident) => {
        impl $trait for $type {
            fn $method(&mut self, rhs: Self) {
                self.0.$method(rhs.0);
            }
        }
    };
    (unary $type:ty, $trait:ident, $method:ident) => {
        impl $trait for $type {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self(self.0.$method())
            }
        }
    };
}
