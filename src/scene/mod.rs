pub(crate) mod background;
pub(crate) mod element;
pub(crate) mod project;
