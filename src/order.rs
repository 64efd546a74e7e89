/// Order of the key groups in the output
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Order {
    /// Keys in collation order, the default
    #[default]
    Asc,
    /// Keys in reverse collation order
    Desc,
}
