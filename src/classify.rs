//! Completeness classification
//!
//! Pure, deterministic, no I/O. A card is complete iff all four field
//! groups are satisfied: a name, a company name, a role (any position or
//! department field), and a way to reach the person. Address and note
//! fields never affect classification.

use crate::card::{Card, Completeness};

/// Classify a card's completeness state.
///
/// Each group is an OR across its localization variants; the result is
/// the AND of the four groups.
pub fn classify(card: &Card) -> Completeness {
    let has_name = !card.name_zh.is_empty() || !card.name_en.is_empty();

    let has_company = !card.company_name_zh.is_empty() || !card.company_name_en.is_empty();

    let has_role = !card.position_zh.is_empty()
        || !card.position_en.is_empty()
        || !card.position1_zh.is_empty()
        || !card.position1_en.is_empty()
        || !card.department1_zh.is_empty()
        || !card.department1_en.is_empty()
        || !card.department2_zh.is_empty()
        || !card.department2_en.is_empty()
        || !card.department3_zh.is_empty()
        || !card.department3_en.is_empty();

    let has_contact = !card.mobile_phone.is_empty()
        || !card.company_phone1.is_empty()
        || !card.company_phone2.is_empty()
        || !card.email.is_empty()
        || !card.line_id.is_empty();

    if has_name && has_company && has_role && has_contact {
        Completeness::Complete
    } else {
        Completeness::Incomplete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn set_field(card: &mut Card, index: usize, value: &str) {
        let value = value.to_string();
        match index {
            0 => card.name_zh = value,
            1 => card.name_en = value,
            2 => card.company_name_zh = value,
            3 => card.company_name_en = value,
            4 => card.position_zh = value,
            5 => card.position_en = value,
            6 => card.position1_zh = value,
            7 => card.position1_en = value,
            8 => card.department1_zh = value,
            9 => card.department1_en = value,
            10 => card.department2_zh = value,
            11 => card.department2_en = value,
            12 => card.department3_zh = value,
            13 => card.department3_en = value,
            14 => card.mobile_phone = value,
            15 => card.company_phone1 = value,
            16 => card.company_phone2 = value,
            17 => card.email = value,
            18 => card.line_id = value,
            19 => card.company_address1_zh = value,
            20 => card.company_address1_en = value,
            21 => card.company_address2_zh = value,
            22 => card.company_address2_en = value,
            23 => card.note1 = value,
            24 => card.note2 = value,
            _ => unreachable!(),
        }
    }

    /// Reference formula, written directly against the group definition
    fn expected(card: &Card) -> Completeness {
        let fields = card.text_fields();
        let group = |range: std::ops::Range<usize>| fields[range].iter().any(|f| !f.is_empty());
        if group(0..2) && group(2..4) && group(4..14) && group(14..19) {
            Completeness::Complete
        } else {
            Completeness::Incomplete
        }
    }

    #[test]
    fn fully_populated_card_is_complete() {
        let mut card = Card::new();
        for i in 0..25 {
            set_field(&mut card, i, "x");
        }
        assert_eq!(classify(&card), Completeness::Complete);
    }

    #[test]
    fn empty_card_is_incomplete() {
        assert_eq!(classify(&Card::new()), Completeness::Incomplete);
    }

    #[test]
    fn minimal_complete_card() {
        let mut card = Card::new();
        card.name_en = "Jane".into();
        card.company_name_en = "Acme".into();
        card.department3_en = "Sales".into();
        card.line_id = "jane123".into();
        assert_eq!(classify(&card), Completeness::Complete);
    }

    #[test]
    fn name_and_contact_alone_are_not_enough() {
        // Role group empty fails the AND even with identity, company, and
        // contact present.
        let mut card = Card::new();
        card.name_zh = "张三".into();
        card.company_name_zh = "示例科技".into();
        card.mobile_phone = "13800138000".into();
        assert_eq!(classify(&card), Completeness::Incomplete);
    }

    #[test]
    fn each_missing_group_breaks_completeness() {
        // Start complete, then empty one group at a time
        let complete = {
            let mut c = Card::new();
            c.name_zh = "张三".into();
            c.company_name_zh = "示例科技".into();
            c.position_zh = "经理".into();
            c.email = "z@example.com".into();
            c
        };
        assert_eq!(classify(&complete), Completeness::Complete);

        let mut no_name = complete.clone();
        no_name.name_zh.clear();
        assert_eq!(classify(&no_name), Completeness::Incomplete);

        let mut no_company = complete.clone();
        no_company.company_name_zh.clear();
        assert_eq!(classify(&no_company), Completeness::Incomplete);

        let mut no_role = complete.clone();
        no_role.position_zh.clear();
        assert_eq!(classify(&no_role), Completeness::Incomplete);

        let mut no_contact = complete.clone();
        no_contact.email.clear();
        assert_eq!(classify(&no_contact), Completeness::Incomplete);
    }

    #[test]
    fn address_and_notes_never_affect_classification() {
        let mut card = Card::new();
        card.company_address1_zh = "台北市".into();
        card.company_address2_en = "2F".into();
        card.note1 = "met at expo".into();
        card.note2 = "follow up".into();
        assert_eq!(classify(&card), Completeness::Incomplete);
    }

    #[test]
    fn random_field_subsets_match_reference_formula() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..2000 {
            let mut card = Card::new();
            for i in 0..25 {
                if rng.gen_bool(0.3) {
                    set_field(&mut card, i, "v");
                }
            }
            assert_eq!(classify(&card), expected(&card), "card: {card:?}");
        }
    }
}
