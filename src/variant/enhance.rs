//! 文字認識向けの画質調整
//!
//! 係数の意味は一般的な画像編集ツールと同じ（1.0 で元画像のまま）。

use image::{imageops, DynamicImage, Rgb, RgbImage};

/// 追加処理用の強い補正の組み合わせ（grayscale → invert → contrast → brightness → sharpness）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UltraRecipe {
    pub name: &'static str,
    pub grayscale: bool,
    pub invert: bool,
    pub contrast: f32,
    pub brightness: f32,
    pub sharpness: f32,
}

pub const ULTRA_RECIPES: &[UltraRecipe] = &[
    UltraRecipe {
        name: "combined",
        grayscale: false,
        invert: false,
        contrast: 5.0,
        brightness: 2.0,
        sharpness: 5.0,
    },
    UltraRecipe {
        name: "extreme_gray",
        grayscale: true,
        invert: false,
        contrast: 8.0,
        brightness: 1.8,
        sharpness: 8.0,
    },
    // 白地に白文字
    UltraRecipe {
        name: "inverted",
        grayscale: true,
        invert: true,
        contrast: 10.0,
        brightness: 0.8,
        sharpness: 1.0,
    },
    UltraRecipe {
        name: "bright",
        grayscale: false,
        invert: false,
        contrast: 8.0,
        brightness: 2.5,
        sharpness: 2.0,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Enhancement {
    Original,
    Contrast(f32),
    Brightness(f32),
    Sharpness(f32),
    EdgeEnhance,
    Grayscale,
    Invert,
    Ultra(&'static UltraRecipe),
}

impl Enhancement {
    pub fn name(&self) -> &'static str {
        match self {
            Enhancement::Original => "original",
            Enhancement::Contrast(_) => "contrast",
            Enhancement::Brightness(_) => "brightness",
            Enhancement::Sharpness(_) => "sharp",
            Enhancement::EdgeEnhance => "edge",
            Enhancement::Grayscale => "gray",
            Enhancement::Invert => "invert",
            Enhancement::Ultra(recipe) => recipe.name,
        }
    }

    pub fn apply(&self, img: &RgbImage) -> RgbImage {
        match self {
            Enhancement::Original => img.clone(),
            Enhancement::Contrast(factor) => contrast(img, *factor),
            Enhancement::Brightness(factor) => brightness(img, *factor),
            Enhancement::Sharpness(factor) => sharpness(img, *factor),
            Enhancement::EdgeEnhance => edge_enhance(img),
            Enhancement::Grayscale => grayscale(img),
            Enhancement::Invert => invert(img),
            Enhancement::Ultra(recipe) => {
                let mut out = if recipe.grayscale { grayscale(img) } else { img.clone() };
                if recipe.invert {
                    imageops::invert(&mut out);
                }
                let out = contrast(&out, recipe.contrast);
                let out = brightness(&out, recipe.brightness);
                sharpness(&out, recipe.sharpness)
            }
        }
    }
}

fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// 平均輝度を中心にコントラストを広げる
pub fn contrast(img: &RgbImage, factor: f32) -> RgbImage {
    let gray = imageops::grayscale(img);
    let pixels = gray.as_raw();
    let mean = if pixels.is_empty() {
        0.0
    } else {
        pixels.iter().map(|&p| p as f32).sum::<f32>() / pixels.len() as f32
    };

    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        for c in pixel.0.iter_mut() {
            *c = clamp_u8(mean + factor * (*c as f32 - mean));
        }
    }
    out
}

pub fn brightness(img: &RgbImage, factor: f32) -> RgbImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        for c in pixel.0.iter_mut() {
            *c = clamp_u8(*c as f32 * factor);
        }
    }
    out
}

/// ぼかした画像との差を `factor` 倍する（1.0 で元画像）
pub fn sharpness(img: &RgbImage, factor: f32) -> RgbImage {
    let blurred = imageops::blur(img, 1.0);
    let mut out = img.clone();
    for (pixel, soft) in out.pixels_mut().zip(blurred.pixels()) {
        for (c, s) in pixel.0.iter_mut().zip(soft.0.iter()) {
            let s = *s as f32;
            *c = clamp_u8(s + factor * (*c as f32 - s));
        }
    }
    out
}

pub fn edge_enhance(img: &RgbImage) -> RgbImage {
    const KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0];
    imageops::filter3x3(img, &KERNEL)
}

pub fn grayscale(img: &RgbImage) -> RgbImage {
    DynamicImage::ImageLuma8(imageops::grayscale(img)).to_rgb8()
}

pub fn invert(img: &RgbImage) -> RgbImage {
    let mut out = img.clone();
    imageops::invert(&mut out);
    out
}

/// 単色画像（テスト・確認用）
pub fn solid(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> RgbImage {
        RgbImage::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 100]))
    }

    #[test]
    fn test_contrast_identity() {
        let img = gradient();
        assert_eq!(contrast(&img, 1.0), img);
    }

    #[test]
    fn test_contrast_spreads_values() {
        let img = RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([100; 3]) } else { Rgb([150; 3]) });
        let out = contrast(&img, 2.0);
        // 平均125から2倍に広がる
        assert_eq!(out.get_pixel(0, 0).0, [75; 3]);
        assert_eq!(out.get_pixel(1, 0).0, [175; 3]);
    }

    #[test]
    fn test_brightness_clamps() {
        let out = brightness(&solid(2, 2, 200), 1.5);
        assert_eq!(out.get_pixel(0, 0).0, [255; 3]);
        let out = brightness(&solid(2, 2, 100), 0.5);
        assert_eq!(out.get_pixel(1, 1).0, [50; 3]);
    }

    #[test]
    fn test_sharpness_identity() {
        let img = gradient();
        assert_eq!(sharpness(&img, 1.0), img);
    }

    #[test]
    fn test_grayscale_channels_equal() {
        let out = grayscale(&gradient());
        for p in out.pixels() {
            assert_eq!(p.0[0], p.0[1]);
            assert_eq!(p.0[1], p.0[2]);
        }
    }

    #[test]
    fn test_invert() {
        assert_eq!(invert(&solid(1, 1, 10)).get_pixel(0, 0).0, [245; 3]);
    }

    #[test]
    fn test_enhancements_keep_dimensions() {
        let img = gradient();
        let all = [
            Enhancement::Original,
            Enhancement::Contrast(2.0),
            Enhancement::Brightness(1.3),
            Enhancement::Sharpness(2.0),
            Enhancement::EdgeEnhance,
            Enhancement::Grayscale,
            Enhancement::Invert,
            Enhancement::Ultra(&ULTRA_RECIPES[2]),
        ];
        for enhancement in all {
            assert_eq!(enhancement.apply(&img).dimensions(), (8, 8), "{}", enhancement.name());
        }
    }
}
