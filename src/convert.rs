// 该文件是 Shanan （山南西风） 项目的一部分。
// src/convert.rs - NV21 到 NCHW 浮点张量的转换核心
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

//! # NV21 转换核心
//!
//! 一次完成色彩空间转换（BT.601 有限范围 → 全范围 RGB）、最近邻缩放、
//! 归一化以及 HWC → CHW 的排列转换。
//!
//! ```
//! use shanan_nv21::convert::convert;
//!
//! # fn main() -> Result<(), shanan_nv21::error::ConvertError> {
//! let nv21 = vec![128u8; 4 * 4 * 3 / 2];
//! let tensor = convert(&nv21, 4, 4, 8, 8)?;
//! assert_eq!(tensor.len(), 3 * 8 * 8);
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::debug;

use crate::{
  error::ConvertError,
  frame::{AsNv21Frame, Nv21Frame, dimension},
  scale::StretchMapping,
  tensor::{NchwTensor, RGB_CHANNELS},
};

/// 定点 YUV → RGB，返回未截断的 `[r, g, b]`
///
/// 系数与常见参考解码器一致，右移为算术右移。
#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [i32; 3] {
  let c = y as i32 - 16;
  let d = u as i32 - 128;
  let e = v as i32 - 128;

  let r = (298 * c + 409 * e + 128) >> 8;
  let g = (298 * c - 100 * d - 208 * e + 128) >> 8;
  let b = (298 * c + 516 * d + 128) >> 8;
  [r, g, b]
}

/// 截断到 `[0, 255]` 后除以 255.0
#[inline]
pub fn normalize(value: i32) -> f32 {
  value.clamp(0, 255) as f32 / 255.0
}

/// NV21 帧转换器，目标尺寸固定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConverter {
  dst_width: usize,
  dst_height: usize,
}

impl FrameConverter {
  /// 目标尺寸必须为正，且输出张量的字节数不超过 `isize::MAX`
  pub fn new(dst_width: i32, dst_height: i32) -> Result<Self, ConvertError> {
    let width = dimension("目标宽度", dst_width)?;
    let height = dimension("目标高度", dst_height)?;
    width
      .checked_mul(height)
      .and_then(|n| n.checked_mul(RGB_CHANNELS * std::mem::size_of::<f32>()))
      .filter(|&bytes| bytes <= isize::MAX as usize)
      .ok_or_else(|| {
        ConvertError::invalid(format!("目标尺寸 {}x{} 过大", dst_width, dst_height))
      })?;

    Ok(Self {
      dst_width: width,
      dst_height: height,
    })
  }

  pub fn dst_width(&self) -> usize {
    self.dst_width
  }

  pub fn dst_height(&self) -> usize {
    self.dst_height
  }

  /// 从可能已释放的帧转换
  pub fn convert_frame<F: AsNv21Frame>(&self, frame: &F) -> Result<NchwTensor, ConvertError> {
    let data = frame
      .as_nv21()
      .ok_or_else(|| ConvertError::unavailable("无法获取 NV21 帧数据"))?;
    let frame = Nv21Frame::new(data, frame.width(), frame.height())?;
    Ok(self.convert(&frame))
  }

  /// 转换已校验的帧视图
  pub fn convert(&self, frame: &Nv21Frame<'_>) -> NchwTensor {
    let (dst_width, dst_height) = (self.dst_width, self.dst_height);
    let mapping =
      StretchMapping::from_sizes((frame.width(), frame.height()), (dst_width, dst_height));
    debug!(
      "NV21 转换: {}x{} -> {}x{}",
      frame.width(),
      frame.height(),
      dst_width,
      dst_height
    );

    let plane = dst_width * dst_height;
    let mut data = vec![0.0f32; RGB_CHANNELS * plane];
    let (red, rest) = data.split_at_mut(plane);
    let (green, blue) = rest.split_at_mut(plane);

    let rows;
    #[cfg(feature = "rayon")]
    {
      rows = red
        .par_chunks_exact_mut(dst_width)
        .zip(green.par_chunks_exact_mut(dst_width))
        .zip(blue.par_chunks_exact_mut(dst_width))
        .enumerate();
    }
    #[cfg(not(feature = "rayon"))]
    {
      rows = red
        .chunks_exact_mut(dst_width)
        .zip(green.chunks_exact_mut(dst_width))
        .zip(blue.chunks_exact_mut(dst_width))
        .enumerate();
    }
    rows.for_each(|(y, ((r_row, g_row), b_row))| {
      convert_row(frame, &mapping, y, r_row, g_row, b_row);
    });

    NchwTensor::from_parts(data, dst_width, dst_height)
  }
}

/// 转换一行目标像素
fn convert_row(
  frame: &Nv21Frame<'_>,
  mapping: &StretchMapping,
  y: usize,
  r_row: &mut [f32],
  g_row: &mut [f32],
  b_row: &mut [f32],
) {
  let src_width = frame.width();
  let sy = mapping.sample_y(y);
  let luma_row = &frame.luma()[sy * src_width..(sy + 1) * src_width];
  // 色度平面按源宽度作为行跨度寻址
  let chroma_row = &frame.chroma()[(sy / 2) * src_width..];

  for (x, ((r, g), b)) in r_row
    .iter_mut()
    .zip(g_row.iter_mut())
    .zip(b_row.iter_mut())
    .enumerate()
  {
    let sx = mapping.sample_x(x);
    let cell = (sx / 2) * 2;
    let [cr, cg, cb] = yuv_to_rgb(luma_row[sx], chroma_row[cell + 1], chroma_row[cell]);
    *r = normalize(cr);
    *g = normalize(cg);
    *b = normalize(cb);
  }
}

/// 边界接口：`convert(source, srcW, srcH, dstW, dstH)`
///
/// 返回长度为 `3 * dst_width * dst_height` 的张量；尺寸非法或缓冲区不足时返回
/// `InvalidInput`，不会越界读取。
pub fn convert(
  source: &[u8],
  src_width: i32,
  src_height: i32,
  dst_width: i32,
  dst_height: i32,
) -> Result<NchwTensor, ConvertError> {
  let converter = FrameConverter::new(dst_width, dst_height)?;
  let frame = Nv21Frame::new(source, src_width, src_height)?;
  Ok(converter.convert(&frame))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::Nv21Buffer;

  fn level(v: i32) -> f32 {
    v as f32 / 255.0
  }

  #[test]
  fn fixed_point_white_and_black() {
    assert_eq!(yuv_to_rgb(235, 128, 128), [255, 255, 255]);
    assert_eq!(yuv_to_rgb(16, 128, 128), [0, 0, 0]);
  }

  #[test]
  fn fixed_point_uses_arithmetic_shift() {
    // C = -16 -> (298 * -16 + 128) >> 8 = -4640 >> 8 = -19（向下取整）
    assert_eq!(yuv_to_rgb(0, 128, 128), [-19, -19, -19]);
  }

  #[test]
  fn fixed_point_saturated_red() {
    // Y = 128, V = 255: R = 333, G = 27, B = 130
    assert_eq!(yuv_to_rgb(128, 128, 255), [333, 27, 130]);
  }

  #[test]
  fn normalize_clamps_and_divides_by_255() {
    assert_eq!(normalize(-19), 0.0);
    assert_eq!(normalize(333), 1.0);
    assert_eq!(normalize(130), 130.0 / 255.0);
  }

  #[test]
  fn converter_rejects_bad_target() {
    assert!(FrameConverter::new(0, 640).unwrap_err().is_invalid_input());
    assert!(FrameConverter::new(640, -1).unwrap_err().is_invalid_input());
  }

  #[test]
  fn oversized_target_is_invalid_input() {
    let err = convert(&[16, 128, 128], 1, 1, i32::MAX, i32::MAX).unwrap_err();
    assert!(err.is_invalid_input());
  }

  #[test]
  fn convert_rejects_short_source() {
    let source = vec![0u8; 4 * 4 * 3 / 2 - 1];
    assert!(convert(&source, 4, 4, 2, 2).unwrap_err().is_invalid_input());
  }

  #[test]
  fn convert_rejects_bad_source_dimensions() {
    assert!(convert(&[], 0, 4, 2, 2).unwrap_err().is_invalid_input());
    assert!(convert(&[], 4, -4, 2, 2).unwrap_err().is_invalid_input());
  }

  #[test]
  fn uniform_gray_fills_every_plane() {
    let buffer = Nv21Buffer::uniform(6, 4, 128, 128, 128).unwrap();
    let tensor = FrameConverter::new(3, 5).unwrap().convert_frame(&buffer).unwrap();
    assert_eq!(tensor.len(), 3 * 3 * 5);
    assert!(tensor.as_slice().iter().all(|&v| v == level(130)));
  }

  #[test]
  fn released_frame_is_resource_unavailable() {
    let mut buffer = Nv21Buffer::uniform(4, 4, 128, 128, 128).unwrap();
    buffer.release();
    let err = FrameConverter::new(4, 4).unwrap().convert_frame(&buffer).unwrap_err();
    assert!(err.is_resource_unavailable());
  }

  #[test]
  fn chroma_quadrants_stay_aligned() {
    // 4x4 源，色度 2x2 单元：左上 V=255，右下 U=255，其余中性
    let mut data = vec![128u8; 24];
    let chroma = &mut data[16..];
    chroma.copy_from_slice(&[255, 128, 128, 128, 128, 128, 128, 255]);

    let tensor = convert(&data, 4, 4, 4, 4).unwrap();
    for y in 0..4 {
      for x in 0..4 {
        let [r, g, b] = tensor.pixel(x, y);
        match (x / 2, y / 2) {
          (0, 0) => assert_eq!([r, g, b], [1.0, level(27), level(130)]),
          (1, 1) => {
            // U = 255: G = (33376 - 12700 + 128) >> 8 = 81, B 饱和
            assert_eq!([r, g, b], [level(130), level(81), 1.0]);
          }
          _ => assert_eq!([r, g, b], [level(130); 3]),
        }
      }
    }
  }

  #[test]
  fn chroma_quadrants_survive_upscale() {
    let mut data = vec![128u8; 24];
    data[16] = 255;
    let tensor = convert(&data, 4, 4, 8, 8).unwrap();
    for y in 0..8 {
      for x in 0..8 {
        let red = tensor.pixel(x, y)[0];
        if x < 4 && y < 4 {
          assert_eq!(red, 1.0);
        } else {
          assert_eq!(red, level(130));
        }
      }
    }
  }

  #[test]
  fn downscale_picks_floor_samples() {
    // 亮度按列递增，色度中性
    let mut data = vec![128u8; 24];
    for y in 0..4 {
      for x in 0..4 {
        data[y * 4 + x] = 16 + (x as u8) * 50;
      }
    }
    let tensor = convert(&data, 4, 4, 2, 2).unwrap();
    // sx = 0, 2
    let expected = |x: usize| {
      let c = (x as i32) * 50;
      normalize((298 * c + 128) >> 8)
    };
    assert_eq!(tensor.plane(0), &[expected(0), expected(2), expected(0), expected(2)]);
  }

  #[test]
  fn odd_dimensions_stay_in_bounds() {
    let source = vec![200u8; crate::frame::nv21_len(5, 3).unwrap()];
    let tensor = convert(&source, 5, 3, 7, 9).unwrap();
    assert_eq!(tensor.len(), 3 * 7 * 9);
  }
}
