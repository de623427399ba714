// 该文件是 Shanan （山南西风） 项目的一部分。
// src/scale.rs - 拉伸缩放坐标映射
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

use crate::error::ConvertError;
use crate::frame::dimension;

/// 源尺寸与目标尺寸之间的拉伸映射（不做 letterbox，X/Y 独立缩放）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StretchMapping {
  src_width: usize,
  src_height: usize,
  dst_width: usize,
  dst_height: usize,
}

impl StretchMapping {
  pub fn new(
    src_width: i32,
    src_height: i32,
    dst_width: i32,
    dst_height: i32,
  ) -> Result<Self, ConvertError> {
    Ok(Self {
      src_width: dimension("源宽度", src_width)?,
      src_height: dimension("源高度", src_height)?,
      dst_width: dimension("目标宽度", dst_width)?,
      dst_height: dimension("目标高度", dst_height)?,
    })
  }

  pub(crate) fn from_sizes(src: (usize, usize), dst: (usize, usize)) -> Self {
    Self {
      src_width: src.0,
      src_height: src.1,
      dst_width: dst.0,
      dst_height: dst.1,
    }
  }

  pub fn src_size(&self) -> (usize, usize) {
    (self.src_width, self.src_height)
  }

  pub fn dst_size(&self) -> (usize, usize) {
    (self.dst_width, self.dst_height)
  }

  /// 目标列对应的源列：`floor(x * src_w / dst_w)`
  #[inline]
  pub fn sample_x(&self, x: usize) -> usize {
    scale_index(x, self.src_width, self.dst_width)
  }

  /// 目标行对应的源行：`floor(y * src_h / dst_h)`
  #[inline]
  pub fn sample_y(&self, y: usize) -> usize {
    scale_index(y, self.src_height, self.dst_height)
  }

  /// 最近邻采样坐标
  #[inline]
  pub fn sample(&self, x: usize, y: usize) -> (usize, usize) {
    (self.sample_x(x), self.sample_y(y))
  }

  /// 将目标空间中的坐标映射回源帧像素坐标
  pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
    (
      x * self.src_width as f32 / self.dst_width as f32,
      y * self.src_height as f32 / self.dst_height as f32,
    )
  }

  /// 将目标空间中的坐标映射为相对源帧的归一化坐标，并截断到 `[0, 1]`
  pub fn to_normalized(&self, x: f32, y: f32) -> (f32, f32) {
    (
      (x / self.dst_width as f32).clamp(0.0, 1.0),
      (y / self.dst_height as f32).clamp(0.0, 1.0),
    )
  }

  /// 将目标空间中的边框 `[x_min, y_min, x_max, y_max]` 映射为归一化边框
  pub fn bbox_to_normalized(&self, bbox: [f32; 4]) -> [f32; 4] {
    let (x_min, y_min) = self.to_normalized(bbox[0], bbox[1]);
    let (x_max, y_max) = self.to_normalized(bbox[2], bbox[3]);
    [x_min, y_min, x_max, y_max]
  }
}

/// `floor(i * src / dst)`，乘积以 u64 计算
#[inline]
fn scale_index(i: usize, src: usize, dst: usize) -> usize {
  (i as u64 * src as u64 / dst as u64) as usize
}
