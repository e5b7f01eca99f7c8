use image::RgbImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn detect(width: u32, height: u32) -> Self {
        if height > width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// 右下隅までの切り出し領域（開始位置を幅・高さに対する比率で持つ）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// 画素座標に変換する（面積0なら None）
    pub fn to_pixels(&self, width: u32, height: u32) -> Option<PixelRect> {
        let x = ((self.x.clamp(0.0, 1.0) * width as f64) as u32).min(width);
        let y = ((self.y.clamp(0.0, 1.0) * height as f64) as u32).min(height);
        let rect = PixelRect { x, y, width: width - x, height: height - y };
        (rect.width > 0 && rect.height > 0).then_some(rect)
    }
}

/// オーバーレイがあるとみなす領域
///
/// 縦長: 右半分・下1/5、横長: 右40%・下30%
pub fn overlay_region(orientation: Orientation) -> CropRegion {
    match orientation {
        Orientation::Portrait => CropRegion { x: 0.5, y: 0.8 },
        Orientation::Landscape => CropRegion { x: 0.6, y: 0.7 },
    }
}

/// 追加処理用のさらに狭い領域
pub fn narrow_region(orientation: Orientation) -> CropRegion {
    match orientation {
        Orientation::Portrait => CropRegion { x: 0.7, y: 0.85 },
        Orientation::Landscape => CropRegion { x: 0.75, y: 0.8 },
    }
}

pub fn crop(img: &RgbImage, rect: PixelRect) -> RgbImage {
    image::imageops::crop_imm(img, rect.x, rect.y, rect.width, rect.height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation() {
        assert_eq!(Orientation::detect(100, 200), Orientation::Portrait);
        assert_eq!(Orientation::detect(200, 100), Orientation::Landscape);
        // 正方形は横長扱い
        assert_eq!(Orientation::detect(100, 100), Orientation::Landscape);
    }

    #[test]
    fn test_overlay_region_portrait() {
        let rect = overlay_region(Orientation::Portrait).to_pixels(100, 200).unwrap();
        assert_eq!(rect, PixelRect { x: 50, y: 160, width: 50, height: 40 });
    }

    #[test]
    fn test_overlay_region_landscape() {
        let rect = overlay_region(Orientation::Landscape).to_pixels(200, 100).unwrap();
        assert_eq!(rect, PixelRect { x: 120, y: 70, width: 80, height: 30 });
    }

    #[test]
    fn test_zero_area_region() {
        assert!(overlay_region(Orientation::Landscape).to_pixels(200, 0).is_none());
        // 1pxの画像でも切り出しは1px残る
        assert!(overlay_region(Orientation::Landscape).to_pixels(1, 1).is_some());
        assert!(CropRegion { x: 1.0, y: 0.0 }.to_pixels(10, 10).is_none());
    }

    #[test]
    fn test_crop_copies_pixels() {
        let img = RgbImage::from_fn(10, 10, |x, y| image::Rgb([x as u8, y as u8, 0]));
        let cropped = crop(&img, PixelRect { x: 6, y: 7, width: 4, height: 3 });
        assert_eq!(cropped.dimensions(), (4, 3));
        assert_eq!(cropped.get_pixel(0, 0).0, [6, 7, 0]);
    }
}
