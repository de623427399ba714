// 该文件是 Shanan （山南西风） 项目的一部分。
// src/tensor.rs - NCHW 浮点张量
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

pub const RGB_CHANNELS: usize = 3;

/// 通道平面排列的 RGB 张量，数值归一化到 `[0, 1]`
///
/// 数据依次为 R、G、B 三个平面，每个平面 `width * height` 个行优先浮点数。
#[derive(Debug, Clone, PartialEq)]
pub struct NchwTensor {
  data: Box<[f32]>,
  width: usize,
  height: usize,
}

impl NchwTensor {
  pub(crate) fn from_parts(data: Vec<f32>, width: usize, height: usize) -> Self {
    debug_assert_eq!(data.len(), RGB_CHANNELS * width * height);
    Self {
      data: data.into_boxed_slice(),
      width,
      height,
    }
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  /// `[1, 3, H, W]`
  pub fn shape(&self) -> [usize; 4] {
    [1, RGB_CHANNELS, self.height, self.width]
  }

  pub fn plane_len(&self) -> usize {
    self.width * self.height
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// 第 `c` 个通道平面（0 = R, 1 = G, 2 = B）
  pub fn plane(&self, c: usize) -> &[f32] {
    let n = self.plane_len();
    &self.data[c * n..(c + 1) * n]
  }

  /// 像素 `(x, y)` 的 `[r, g, b]`
  pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
    let n = self.plane_len();
    let i = y * self.width + x;
    [self.data[i], self.data[i + n], self.data[i + 2 * n]]
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }

  pub fn into_vec(self) -> Vec<f32> {
    self.data.into_vec()
  }

  /// 小端序原始字节
  pub fn to_le_bytes(&self) -> Vec<u8> {
    self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
  }

  /// 张量描述信息
  pub fn metadata(&self) -> serde_json::Value {
    serde_json::json!({
      "shape": self.shape(),
      "layout": "NCHW",
      "dtype": "float32",
      "byte_order": "little",
    })
  }
}

#[cfg(feature = "save_image_file")]
impl NchwTensor {
  /// 反归一化为 RGB 预览图
  pub fn to_rgb_image(&self) -> image::RgbImage {
    image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
      let rgb = self.pixel(x as usize, y as usize);
      image::Rgb(rgb.map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8))
    })
  }
}
