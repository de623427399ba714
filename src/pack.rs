// 该文件是 Shanan （山南西风） 项目的一部分。
// src/pack.rs - 相机三平面数据打包为 NV21
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

//! 相机通常以三个带跨度的平面（Y、U、V）交付 YUV420 图像，
//! U/V 平面的像素跨度为 1（平面）或 2（半平面）。
//! 本模块将其紧凑打包为 NV21 缓冲区。

use tracing::debug;

use crate::{
  error::ConvertError,
  frame::{Nv21Buffer, dimension, nv21_len},
};

/// 带行跨度与像素跨度的平面
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
  pub data: &'a [u8],
  pub row_stride: usize,
  pub pixel_stride: usize,
}

impl<'a> Plane<'a> {
  pub fn new(data: &'a [u8], row_stride: usize, pixel_stride: usize) -> Self {
    Self {
      data,
      row_stride,
      pixel_stride,
    }
  }

  /// 紧凑平面：像素跨度 1，行跨度等于宽度
  pub fn packed(data: &'a [u8], width: usize) -> Self {
    Self::new(data, width, 1)
  }

  fn check(&self, name: &str, width: usize, height: usize) -> Result<(), ConvertError> {
    if self.pixel_stride == 0 || self.row_stride == 0 {
      return Err(ConvertError::invalid(format!("{} 平面跨度不能为 0", name)));
    }
    // 最后一行可以短于行跨度
    let needed = (height - 1)
      .checked_mul(self.row_stride)
      .and_then(|n| n.checked_add((width - 1).checked_mul(self.pixel_stride)?))
      .and_then(|n| n.checked_add(1))
      .ok_or_else(|| ConvertError::invalid(format!("{} 平面跨度过大", name)))?;
    if self.data.len() < needed {
      return Err(ConvertError::invalid(format!(
        "{} 平面长度不足: 期望至少 {} 字节, 实际 {} 字节",
        name,
        needed,
        self.data.len()
      )));
    }
    Ok(())
  }

  #[inline]
  fn at(&self, x: usize, y: usize) -> u8 {
    self.data[y * self.row_stride + x * self.pixel_stride]
  }
}

/// YUV420 三平面图像
#[derive(Debug, Clone, Copy)]
pub struct Yuv420Planes<'a> {
  pub width: i32,
  pub height: i32,
  pub y: Plane<'a>,
  pub u: Plane<'a>,
  pub v: Plane<'a>,
}

impl Yuv420Planes<'_> {
  /// 打包为 NV21：亮度紧凑排列，色度按 V、U 交错
  pub fn to_nv21(&self) -> Result<Nv21Buffer, ConvertError> {
    let width = dimension("源宽度", self.width)?;
    let height = dimension("源高度", self.height)?;
    let (chroma_width, chroma_height) = (width.div_ceil(2), height.div_ceil(2));

    self.y.check("Y", width, height)?;
    self.u.check("U", chroma_width, chroma_height)?;
    self.v.check("V", chroma_width, chroma_height)?;

    let mut data = Vec::with_capacity(nv21_len(self.width, self.height)?);
    if self.y.pixel_stride == 1 {
      for row in 0..height {
        let start = row * self.y.row_stride;
        data.extend_from_slice(&self.y.data[start..start + width]);
      }
    } else {
      for row in 0..height {
        data.extend((0..width).map(|x| self.y.at(x, row)));
      }
    }

    for row in 0..chroma_height {
      for x in 0..chroma_width {
        data.push(self.v.at(x, row));
        data.push(self.u.at(x, row));
      }
    }

    debug!(
      "打包 NV21: {}x{}, Y 跨度 {}, U/V 像素跨度 {}/{}",
      width, height, self.y.row_stride, self.u.pixel_stride, self.v.pixel_stride
    );
    Nv21Buffer::new(data, self.width, self.height)
  }
}
