//! Pixel quality screening for the MCD19A2 `AOD_QA` band.
//!
//! A pixel is kept only when it is cloud-free, over land and retrieved at the
//! best quality level. The same criteria table drives both the local predicate
//! and the function shipped to the platform, so the two cannot drift apart.

use crate::domain::expression::Expr;

/// Name of the mapped function's single parameter.
pub const IMAGE_ARG: &str = "image";

/// One packed sub-field of the QA word and the value it must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QaField {
    pub shift: u32,
    pub mask: u32,
    pub required: u32,
}

/// Bits 0-2, 1 = clear.
pub const CLOUD_MASK: QaField = QaField {
    shift: 0,
    mask: 0b111,
    required: 1,
};

/// Bits 3-4, 0 = land.
pub const LAND_WATER_MASK: QaField = QaField {
    shift: 3,
    mask: 0b11,
    required: 0,
};

/// Bits 8-11, 0 = best quality.
pub const AOD_QUALITY: QaField = QaField {
    shift: 8,
    mask: 0b1111,
    required: 0,
};

pub const QA_CRITERIA: [QaField; 3] = [CLOUD_MASK, LAND_WATER_MASK, AOD_QUALITY];

impl QaField {
    pub const fn extract(&self, qa: u32) -> u32 {
        (qa >> self.shift) & self.mask
    }

    pub const fn accepts(&self, qa: u32) -> bool {
        self.extract(qa) == self.required
    }

    /// `((qa >> shift) & mask) == required` as an image expression.
    pub fn condition(&self, qa: Expr) -> Expr {
        let shifted = if self.shift == 0 {
            qa
        } else {
            Expr::call(
                "Image.rightShift",
                [("image1", qa), ("image2", Expr::image_constant(self.shift))],
            )
        };
        let bits = Expr::call(
            "Image.bitwiseAnd",
            [("image1", shifted), ("image2", Expr::image_constant(self.mask))],
        );
        Expr::call(
            "Image.eq",
            [("image1", bits), ("image2", Expr::image_constant(self.required))],
        )
    }
}

pub fn passes_quality_mask(qa: u32) -> bool {
    QA_CRITERIA.iter().all(|field| field.accepts(qa))
}

/// `image -> image.updateMask(all criteria hold on qa_band)`, for `Collection.map`.
pub fn quality_mask_function(qa_band: &str) -> Expr {
    let image = Expr::argument(IMAGE_ARG);
    let qa = Expr::call(
        "Image.select",
        [
            ("input", image.clone()),
            ("bandSelectors", Expr::constant(vec![qa_band])),
        ],
    );

    let [first, rest @ ..] = &QA_CRITERIA;
    let combined = rest
        .iter()
        .fold(first.condition(qa.clone()), |acc, field| {
            Expr::call(
                "Image.and",
                [("image1", acc), ("image2", field.condition(qa.clone()))],
            )
        });

    Expr::function(
        &[IMAGE_ARG],
        Expr::call("Image.updateMask", [("image", image), ("mask", combined)]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(q: u32) -> bool {
        (q & 7) == 1 && ((q >> 3) & 3) == 0 && ((q >> 8) & 15) == 0
    }

    /// Evaluates the mask part of the remote function for a single pixel.
    fn eval_pixel(expr: &Expr, qa: u32) -> u32 {
        let operand = |name: &str| eval_pixel(expr.arg(name).expect(name), qa);
        match expr.function_name() {
            Some("Image.select") => qa,
            Some("Image.constant") => expr
                .arg("value")
                .and_then(Expr::as_constant)
                .and_then(|v| v.as_u64())
                .expect("integer constant") as u32,
            Some("Image.rightShift") => operand("image1") >> operand("image2"),
            Some("Image.bitwiseAnd") => operand("image1") & operand("image2"),
            Some("Image.eq") => (operand("image1") == operand("image2")) as u32,
            Some("Image.and") => (operand("image1") != 0 && operand("image2") != 0) as u32,
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_boundary_bit_patterns() {
        assert!(passes_quality_mask(0b1));
        assert!(!passes_quality_mask(0));
        // land/water bit set
        assert!(!passes_quality_mask(0b1001));
        assert!(!passes_quality_mask(0b1_0001));
        // cloudy / possibly cloudy states
        assert!(!passes_quality_mask(0b010));
        assert!(!passes_quality_mask(0b011));
        // any retrieval-quality bit set
        for bit in 8..12 {
            assert!(!passes_quality_mask(1 | (1 << bit)), "bit {}", bit);
        }
        // bits outside the three fields are ignored
        assert!(passes_quality_mask(1 | 0b1110_0000));
        assert!(passes_quality_mask(1 | (1 << 12) | (1 << 15)));
    }

    #[test]
    fn test_predicate_matches_reference_for_all_u16() {
        for q in 0..=u16::MAX as u32 {
            assert_eq!(passes_quality_mask(q), reference(q), "qa = {:#018b}", q);
        }
    }

    #[test]
    fn test_field_extraction() {
        let qa = 0b1010_0001_0001;
        assert_eq!(CLOUD_MASK.extract(qa), 1);
        assert_eq!(LAND_WATER_MASK.extract(qa), 0b10);
        assert_eq!(AOD_QUALITY.extract(qa), 0b1010);
    }

    #[test]
    fn test_remote_function_agrees_with_local_predicate() {
        let function = quality_mask_function("AOD_QA");
        let body = match &function {
            Expr::Function { params, body } => {
                assert_eq!(params, &vec![IMAGE_ARG.to_string()]);
                body
            }
            other => panic!("expected function, got {:?}", other),
        };
        assert_eq!(body.function_name(), Some("Image.updateMask"));
        assert_eq!(body.arg("image"), Some(&Expr::argument(IMAGE_ARG)));

        let mask = body.arg("mask").unwrap();
        for q in 0..4096u32 {
            assert_eq!(eval_pixel(mask, q) == 1, passes_quality_mask(q), "qa = {}", q);
        }
    }

    #[test]
    fn test_remote_function_selects_qa_band() {
        let function = quality_mask_function("MY_QA");
        let graph = serde_json::to_string(&function.to_graph()).unwrap();
        assert!(graph.contains("\"MY_QA\""));
        assert!(graph.contains("Image.select"));
    }
}
