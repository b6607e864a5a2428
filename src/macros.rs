// implements the binary operators "T op U", "T op &U" and
// "&T op U" based on "&T op &U", for types that are not `Copy`
macro_rules! forward_val_binop {
    (impl $imp:ident, $method:ident for $t:ty, $u:ty) => {
        impl ::core::ops::$imp<$u> for $t {
            type Output = $t;

            #[inline]
            fn $method(self, other: $u) -> Self::Output {
                ::core::ops::$imp::$method(&self, &other)
            }
        }

        impl ::core::ops::$imp<&$u> for $t {
            type Output = $t;

            #[inline]
            fn $method(self, other: &$u) -> Self::Output {
                ::core::ops::$imp::$method(&self, other)
            }
        }

        impl ::core::ops::$imp<$u> for &$t {
            type Output = $t;

            #[inline]
            fn $method(self, other: $u) -> Self::Output {
                ::core::ops::$imp::$method(self, &other)
            }
        }
    };
}
pub(crate) use forward_val_binop;

// implements "T op= U" and "T op= &U" based on "&T op &U"
macro_rules! forward_op_assign {
    (impl $imp:ident, $method:ident, $op:ident, $binop:ident for $t:ty, $u:ty) => {
        impl ::core::ops::$imp<&$u> for $t {
            #[inline]
            fn $method(&mut self, other: &$u) {
                *self = ::core::ops::$op::$binop(&*self, other);
            }
        }

        impl ::core::ops::$imp<$u> for $t {
            #[inline]
            fn $method(&mut self, other: $u) {
                *self = ::core::ops::$op::$binop(&*self, &other);
            }
        }
    };
}
pub(crate) use forward_op_assign;

// implements "&T op &T" via the inherent method `$inherent`,
// plus every by-value combination
macro_rules! binop_impl {
    ($imp:ident, $method:ident, $inherent:ident; $($t:ty)*) => ($(
        impl ::core::ops::$imp<&$t> for &$t {
            type Output = $t;

            #[inline]
            fn $method(self, other: &$t) -> $t {
                <$t>::$inherent(self, other)
            }
        }

        $crate::macros::forward_val_binop! { impl $imp, $method for $t, $t }
    )*)
}
pub(crate) use binop_impl;

// implements "-T" and "-&T" via the inherent method `$inherent`
macro_rules! neg_impl {
    ($inherent:ident; $($t:ty)*) => ($(
        impl ::core::ops::Neg for &$t {
            type Output = $t;

            #[inline]
            fn neg(self) -> $t {
                <$t>::$inherent(self)
            }
        }

        impl ::core::ops::Neg for $t {
            type Output = $t;

            #[inline]
            fn neg(self) -> $t {
                <$t>::$inherent(&self)
            }
        }
    )*)
}
pub(crate) use neg_impl;
