pub(crate) mod handles;
pub(crate) mod hit;
pub(crate) mod machine;
