use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Text that is not one of the dtype spellings.
    #[snafu(display("unrecognized dtype {spec:?}"))]
    UnrecognizedType { spec: String },

    /// Integer wider than the supported maximum.
    #[snafu(display("unsupported integer width {width} (at most {max})", max = crate::MAX_INT_WIDTH))]
    UnsupportedWidth { width: u32 },
}
