// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/convert.rs - NV21 转换性质测试
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

use proptest::prelude::*;
use shanan_nv21::{
  ConvertError, FrameConverter, Nv21Buffer, convert,
  frame::nv21_len,
  pack::{Plane, Yuv420Planes},
  scale::StretchMapping,
};

/// 逐像素的朴素实现，用于对照
fn reference(source: &[u8], sw: usize, sh: usize, dw: usize, dh: usize) -> Vec<f32> {
  let plane = dw * dh;
  let mut out = vec![0.0f32; 3 * plane];
  for y in 0..dh {
    for x in 0..dw {
      let sx = x * sw / dw;
      let sy = y * sh / dh;
      let y_index = sy * sw + sx;
      let uv_index = sw * sh + (sy / 2) * sw + (sx / 2) * 2;
      let c = source[y_index] as i32 - 16;
      let e = source[uv_index] as i32 - 128;
      let d = source[uv_index + 1] as i32 - 128;
      let r = (298 * c + 409 * e + 128) >> 8;
      let g = (298 * c - 100 * d - 208 * e + 128) >> 8;
      let b = (298 * c + 516 * d + 128) >> 8;
      let i = y * dw + x;
      out[i] = r.clamp(0, 255) as f32 / 255.0;
      out[i + plane] = g.clamp(0, 255) as f32 / 255.0;
      out[i + 2 * plane] = b.clamp(0, 255) as f32 / 255.0;
    }
  }
  out
}

fn frame_strategy() -> impl Strategy<Value = (Vec<u8>, i32, i32, i32, i32)> {
  (1i32..24, 1i32..24, 1i32..32, 1i32..32).prop_flat_map(|(sw, sh, dw, dh)| {
    let len = nv21_len(sw, sh).unwrap();
    (
      prop::collection::vec(any::<u8>(), len),
      Just(sw),
      Just(sh),
      Just(dw),
      Just(dh),
    )
  })
}

proptest! {
  #[test]
  fn matches_reference((source, sw, sh, dw, dh) in frame_strategy()) {
    let tensor = convert(&source, sw, sh, dw, dh).unwrap();
    let expected = reference(&source, sw as usize, sh as usize, dw as usize, dh as usize);
    prop_assert_eq!(tensor.as_slice(), &expected[..]);
  }

  #[test]
  fn deterministic((source, sw, sh, dw, dh) in frame_strategy()) {
    let a = convert(&source, sw, sh, dw, dh).unwrap();
    let b = convert(&source, sw, sh, dw, dh).unwrap();
    let a_bits: Vec<u32> = a.as_slice().iter().map(|v| v.to_bits()).collect();
    let b_bits: Vec<u32> = b.as_slice().iter().map(|v| v.to_bits()).collect();
    prop_assert_eq!(a_bits, b_bits);
  }

  #[test]
  fn shape_and_range((source, sw, sh, dw, dh) in frame_strategy()) {
    let tensor = convert(&source, sw, sh, dw, dh).unwrap();
    prop_assert_eq!(tensor.len(), 3 * dw as usize * dh as usize);
    prop_assert_eq!(tensor.shape(), [1, 3, dh as usize, dw as usize]);
    prop_assert!(tensor.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
  }

  #[test]
  fn identity_scaling_samples_same_pixel(
    (source, sw, sh, _dw, _dh) in frame_strategy()
  ) {
    let mapping = StretchMapping::new(sw, sh, sw, sh).unwrap();
    for y in 0..sh as usize {
      for x in 0..sw as usize {
        prop_assert_eq!(mapping.sample(x, y), (x, y));
      }
    }
    // 中性色度下，恒等缩放的每个像素只由同位置亮度决定
    let mut neutral = source.clone();
    let luma_len = (sw * sh) as usize;
    neutral[luma_len..].fill(128);
    let tensor = convert(&neutral, sw, sh, sw, sh).unwrap();
    for y in 0..sh as usize {
      for x in 0..sw as usize {
        let c = neutral[y * sw as usize + x] as i32 - 16;
        let level = ((298 * c + 128) >> 8).clamp(0, 255) as f32 / 255.0;
        prop_assert_eq!(tensor.pixel(x, y), [level; 3]);
      }
    }
  }

  #[test]
  fn short_buffer_is_invalid_input(
    (source, sw, sh, dw, dh) in frame_strategy(),
    cut in 1usize..8,
  ) {
    let cut = cut.min(source.len());
    let result = convert(&source[..source.len() - cut], sw, sh, dw, dh);
    prop_assert!(matches!(result, Err(ConvertError::InvalidInput(_))));
  }
}

#[test]
fn white_fixture_decodes_to_one() {
  let frame = Nv21Buffer::uniform(64, 48, 235, 128, 128).unwrap();
  let tensor = FrameConverter::new(640, 640).unwrap().convert_frame(&frame).unwrap();
  assert_eq!(tensor.len(), 3 * 640 * 640);
  assert!(tensor.as_slice().iter().all(|&v| v == 1.0));
}

#[test]
fn black_fixture_decodes_to_zero() {
  let frame = Nv21Buffer::uniform(64, 48, 16, 128, 128).unwrap();
  let tensor = FrameConverter::new(32, 32).unwrap().convert_frame(&frame).unwrap();
  assert!(tensor.as_slice().iter().all(|&v| v == 0.0));
}

#[test]
fn non_positive_dimensions_are_invalid_input() {
  let source = vec![0u8; 64];
  for (sw, sh, dw, dh) in [(0, 4, 4, 4), (4, 0, 4, 4), (4, 4, 0, 4), (4, 4, 4, -3)] {
    assert!(convert(&source, sw, sh, dw, dh).unwrap_err().is_invalid_input());
  }
}

#[test]
fn packed_camera_planes_convert_like_nv21() {
  // 4x4 I420：左上色度单元偏红
  let y = [128u8; 16];
  let u = [128u8; 4];
  let v = [255u8, 128, 128, 128];
  let planes = Yuv420Planes {
    width: 4,
    height: 4,
    y: Plane::packed(&y, 4),
    u: Plane::packed(&u, 2),
    v: Plane::packed(&v, 2),
  };
  let frame = planes.to_nv21().unwrap();
  let tensor = FrameConverter::new(4, 4).unwrap().convert_frame(&frame).unwrap();
  assert_eq!(tensor.pixel(1, 1)[0], 1.0);
  assert_eq!(tensor.pixel(2, 2)[0], 130.0 / 255.0);
}
