use std::collections::HashSet;

use proptest::prelude::*;

use segexport::color::{id_to_rgb, rgb_to_id, IdGenerator, ID_SPACE};
use segexport::ir::InstanceId;
use segexport::mask::rle::{self, Rle};
use segexport::mask::{binary_mask_bbox, instance_mask_column_major, regions};
use segexport::packing::png::{decode_label_png, encode_png};
use segexport::packing::{pack_bitmap, unpack_bitmap};

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn id_color_packing_is_bijective(id in 0u32..ID_SPACE) {
        prop_assert_eq!(rgb_to_id(id_to_rgb(id)), id);
    }

    #[test]
    fn color_id_packing_is_bijective(color in proptest_helpers::arb_rgb()) {
        prop_assert_eq!(id_to_rgb(rgb_to_id(color)), color);
    }

    #[test]
    fn rle_decode_inverts_encode((height, width, mask) in proptest_helpers::arb_binary_mask(12)) {
        let encoded = rle::encode(&mask, height, width).expect("encode mask");
        prop_assert_eq!(rle::decode(&encoded).expect("decode rle"), mask.clone());

        let ones = mask.iter().filter(|&&v| v != 0).count() as u64;
        prop_assert_eq!(rle::area(&encoded), ones);
    }

    #[test]
    fn rle_string_form_is_lossless((height, width, mask) in proptest_helpers::arb_binary_mask(12)) {
        let encoded = rle::encode(&mask, height, width).expect("encode mask");
        let text = encoded.to_compressed_string();
        prop_assert!(text.bytes().all(|b| (48..48 + 64).contains(&b)), "non-ascii char in {}", text);

        let parsed = Rle::from_compressed_str(&text, height, width).expect("parse rle string");
        prop_assert_eq!(parsed, encoded);
    }

    #[test]
    fn rle_bbox_matches_region_bbox(raster in proptest_helpers::arb_label_raster(9, 3)) {
        let index = regions(&raster);
        for region in index.iter() {
            let mask = instance_mask_column_major(&raster, InstanceId::new(region.label));
            let encoded = rle::encode(&mask, raster.height() as u32, raster.width() as u32)
                .expect("encode instance mask");
            prop_assert_eq!(rle::to_bbox(&encoded), region.bbox_xywh());
            prop_assert_eq!(rle::area(&encoded), region.area);
        }
    }

    #[test]
    fn row_major_bbox_covers_every_set_pixel(raster in proptest_helpers::arb_label_raster(9, 1)) {
        let mask: Vec<u8> = raster.as_slice().iter().map(|&v| v as u8).collect();
        match binary_mask_bbox(&mask, raster.width()) {
            None => prop_assert!(mask.iter().all(|&v| v == 0)),
            Some([min_row, min_col, max_row, max_col]) => {
                for row in 0..raster.height() {
                    for col in 0..raster.width() {
                        if raster.get(row, col) != 0 {
                            prop_assert!((min_col..max_col).contains(&col));
                            prop_assert!((min_row..max_row).contains(&row));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn packed_bitmap_roundtrips(raster in proptest_helpers::arb_wide_raster(8)) {
        prop_assert_eq!(unpack_bitmap(&pack_bitmap(&raster)), raster.clone());

        let bytes = encode_png(&pack_bitmap(&raster)).expect("encode png");
        prop_assert_eq!(decode_label_png(&bytes).expect("decode png"), raster);
    }

    #[test]
    fn allocated_colors_are_unique(
        categories in proptest_helpers::arb_categories(4),
        seed in any::<u64>(),
        picks in prop::collection::vec(0usize..4, 1..40),
    ) {
        let stuff: HashSet<_> = categories.iter().filter(|c| !c.isthing).map(|c| c.color).collect();
        let things: Vec<_> = categories.iter().filter(|c| c.isthing).map(|c| c.id).collect();
        let mut generator = IdGenerator::with_seed(categories.clone(), seed);

        let mut seen = HashSet::new();
        for pick in picks {
            let category_id = things[pick % things.len()];
            let color = generator.get_color(category_id).expect("unbounded allocation");
            prop_assert_ne!(color, [0, 0, 0]);
            prop_assert!(!stuff.contains(&color), "thing got stuff color {:?}", color);
            prop_assert!(seen.insert(color), "color {:?} handed out twice", color);
        }
    }
}
