//! Manual label nudges for provinces whose representative point makes a
//! poor label position (small or crowded Maritime provinces, coastal BC).

use ai_exposure_region_models::ProvinceCode;

/// `(code, dx, dy)` in projected meters; +y is north.
pub const LABEL_OFFSETS: &[(ProvinceCode, f64, f64)] = &[
    (ProvinceCode::PrinceEdwardIsland, 0.0, 100_000.0),
    (ProvinceCode::NovaScotia, 150_000.0, -100_000.0),
    (ProvinceCode::NewBrunswick, -100_000.0, 50_000.0),
    (ProvinceCode::BritishColumbia, -200_000.0, 0.0),
];

/// Offset applied to `code`'s label, `(0, 0)` if none.
#[must_use]
pub fn label_offset(code: ProvinceCode) -> (f64, f64) {
    LABEL_OFFSETS
        .iter()
        .find(|(c, _, _)| *c == code)
        .map_or((0.0, 0.0), |(_, dx, dy)| (*dx, *dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nudged_provinces() {
        assert_eq!(label_offset(ProvinceCode::NovaScotia), (150_000.0, -100_000.0));
        assert_eq!(label_offset(ProvinceCode::BritishColumbia), (-200_000.0, 0.0));
    }

    #[test]
    fn others_are_not_moved() {
        assert_eq!(label_offset(ProvinceCode::Ontario), (0.0, 0.0));
    }
}
