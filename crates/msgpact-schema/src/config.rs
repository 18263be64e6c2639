/// Controls runtime validation behavior.
///
/// The default is tolerant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationConfig {
    /// When true, structures reject fields that are not declared.
    /// When false, undeclared fields are carried through unchecked.
    pub strict_mode: bool,
}
