//! 前処理済み画像（バリアント）の生成
//!
//! 全体画像とオーバーレイ領域の切り出しそれぞれに、コントラスト・明るさ・
//! シャープ・エッジ強調・グレースケール・反転を個別に適用する。
//! 追加処理（ultra）では強い補正の組み合わせと狭い切り出しを加える。

mod crop;
mod enhance;

pub use crop::{narrow_region, overlay_region, CropRegion, Orientation, PixelRect};
pub use enhance::{solid, Enhancement, UltraRecipe, ULTRA_RECIPES};

use image::{DynamicImage, RgbImage};
use tracing::debug;

/// 追加処理のバリアントのラベル接頭辞
pub const ULTRA_PREFIX: &str = "ultra_";

const STANDARD_ENHANCEMENTS: [Enhancement; 7] = [
    Enhancement::Original,
    Enhancement::Contrast(2.0),
    Enhancement::Brightness(1.3),
    Enhancement::Sharpness(2.0),
    Enhancement::EdgeEnhance,
    Enhancement::Grayscale,
    Enhancement::Invert,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantTier {
    Standard,
    Ultra,
}

/// どの領域にどの補正をかけたか
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformDescriptor {
    pub region_name: &'static str,
    /// None は画像全体
    pub region: Option<CropRegion>,
    pub enhancement: Enhancement,
}

#[derive(Debug, Clone)]
pub struct ImageVariant {
    pub label: String,
    pub tier: VariantTier,
    pub transform: TransformDescriptor,
    pub image: RgbImage,
}

impl ImageVariant {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

pub fn is_ultra_label(label: &str) -> bool {
    label.starts_with(ULTRA_PREFIX)
}

/// 1リクエスト分のバリアントを生成する（`aggressive` で ultra 段を追加）
pub fn generate(image: &DynamicImage, aggressive: bool) -> Vec<ImageVariant> {
    let rgb = image.to_rgb8();
    let mut variants = standard_tier(&rgb);
    if aggressive {
        variants.extend(ultra_tier(&rgb));
    }
    variants
}

/// 指定した段だけを生成する
pub fn generate_tier(image: &DynamicImage, tier: VariantTier) -> Vec<ImageVariant> {
    let rgb = image.to_rgb8();
    match tier {
        VariantTier::Standard => standard_tier(&rgb),
        VariantTier::Ultra => ultra_tier(&rgb),
    }
}

fn standard_tier(rgb: &RgbImage) -> Vec<ImageVariant> {
    let orientation = Orientation::detect(rgb.width(), rgb.height());
    let regions = [("full", None), ("crop", Some(overlay_region(orientation)))];

    let mut variants = Vec::new();
    for (region_name, region) in regions {
        let Some(base) = region_image(rgb, region_name, region) else {
            continue;
        };
        for enhancement in STANDARD_ENHANCEMENTS {
            let label = match enhancement {
                Enhancement::Original => region_name.to_string(),
                _ => format!("{}_{}", region_name, enhancement.name()),
            };
            variants.push(ImageVariant {
                label,
                tier: VariantTier::Standard,
                transform: TransformDescriptor { region_name, region, enhancement },
                image: enhancement.apply(&base),
            });
        }
    }
    variants
}

fn ultra_tier(rgb: &RgbImage) -> Vec<ImageVariant> {
    let orientation = Orientation::detect(rgb.width(), rgb.height());
    let regions = [
        ("crop", overlay_region(orientation)),
        ("narrow", narrow_region(orientation)),
    ];

    let mut variants = Vec::new();
    for (region_name, region) in regions {
        let Some(base) = region_image(rgb, region_name, Some(region)) else {
            continue;
        };
        for recipe in ULTRA_RECIPES {
            let enhancement = Enhancement::Ultra(recipe);
            variants.push(ImageVariant {
                label: format!("{}{}_{}", ULTRA_PREFIX, region_name, recipe.name),
                tier: VariantTier::Ultra,
                transform: TransformDescriptor { region_name, region: Some(region), enhancement },
                image: enhancement.apply(&base),
            });
        }
    }
    variants
}

/// 領域を切り出す（面積0ならそのバリアントだけ飛ばす）
fn region_image(rgb: &RgbImage, name: &str, region: Option<CropRegion>) -> Option<RgbImage> {
    let (width, height) = rgb.dimensions();
    match region {
        None if width > 0 && height > 0 => Some(rgb.clone()),
        None => {
            debug!(region = name, width, height, "空の画像のためスキップ");
            None
        }
        Some(region) => match region.to_pixels(width, height) {
            Some(rect) => Some(crop::crop(rgb, rect)),
            None => {
                debug!(region = name, width, height, "切り出し領域が空のためスキップ");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(solid(width, height, 128))
    }

    #[test]
    fn test_standard_tier_count_and_labels() {
        let variants = generate(&image(200, 100), false);
        assert_eq!(variants.len(), 14);
        assert_eq!(variants[0].label, "full");
        assert_eq!(variants[1].label, "full_contrast");
        assert_eq!(variants[7].label, "crop");
        assert!(variants.iter().all(|v| v.tier == VariantTier::Standard));
        assert!(variants.iter().all(|v| !is_ultra_label(&v.label)));
    }

    #[test]
    fn test_aggressive_adds_ultra_tier() {
        let variants = generate(&image(200, 100), true);
        assert_eq!(variants.len(), 22);
        let ultra: Vec<_> = variants.iter().filter(|v| v.tier == VariantTier::Ultra).collect();
        assert_eq!(ultra.len(), 8);
        assert!(ultra.iter().all(|v| is_ultra_label(&v.label)));
        assert_eq!(ultra[0].label, "ultra_crop_combined");
    }

    #[test]
    fn test_crop_dimensions_follow_orientation() {
        let portrait = generate(&image(100, 200), false);
        assert_eq!(portrait[7].dimensions(), (50, 40));
        let landscape = generate(&image(200, 100), false);
        assert_eq!(landscape[7].dimensions(), (80, 30));
    }

    #[test]
    fn test_generate_tier_ultra_only() {
        let variants = generate_tier(&image(200, 100), VariantTier::Ultra);
        assert_eq!(variants.len(), 8);
        assert_eq!(variants[4].label, "ultra_narrow_combined");
    }

    #[test]
    fn test_labels_unique() {
        let variants = generate(&image(64, 48), true);
        let mut labels: Vec<_> = variants.iter().map(|v| v.label.as_str()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), variants.len());
    }
}
