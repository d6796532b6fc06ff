//! Plain-text Wavefront asset pair: an MTL material library and the OBJ
//! geometry that references it.

pub mod mtl;
pub mod obj;

pub use mtl::{Material, MaterialLibrary};
pub use obj::{ObjModel, ObjObject};

/// Parses the remaining tokens of a statement as exactly `N` floats.
pub(crate) fn parse_floats<'a, const N: usize>(
    tokens: impl Iterator<Item = &'a str>,
    line_number: usize,
    statement: &str,
) -> anyhow::Result<[f32; N]> {
    let mut values = [0.0; N];
    let mut count = 0;

    for token in tokens.take(N) {
        values[count] = token.parse().map_err(|_| {
            anyhow::anyhow!("Line {line_number}: invalid number {token:?} in {statement}")
        })?;
        count += 1;
    }

    if count != N {
        return Err(anyhow::anyhow!(
            "Line {line_number}: {statement} expects {N} values, got {count}"
        ));
    }

    Ok(values)
}
