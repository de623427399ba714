// 该文件是 Shanan （山南西风） 项目的一部分。
// src/frame.rs - NV21 帧定义
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

//! NV21（YUV420 半平面，V 在前 U 在后）帧。
//!
//! 内存布局：
//! - 亮度平面：`width * height` 字节，行优先
//! - 色度平面：`ceil(width/2) * ceil(height/2)` 个色度单元，每单元 2 字节，顺序为 V、U

use crate::error::ConvertError;

/// 校验单个尺寸并转换为 `usize`
pub(crate) fn dimension(name: &str, value: i32) -> Result<usize, ConvertError> {
  if value <= 0 {
    return Err(ConvertError::invalid(format!(
      "{} 必须为正数, 实际为 {}",
      name, value
    )));
  }
  Ok(value as usize)
}

/// 计算 NV21 帧所需的字节数：`w*h + 2*ceil(w/2)*ceil(h/2)`
pub fn nv21_len(width: i32, height: i32) -> Result<usize, ConvertError> {
  let w = dimension("源宽度", width)?;
  let h = dimension("源高度", height)?;
  nv21_len_unchecked(w, h)
}

fn nv21_len_unchecked(w: usize, h: usize) -> Result<usize, ConvertError> {
  let overflow = || ConvertError::invalid(format!("帧尺寸 {}x{} 过大", w, h));
  let luma = w.checked_mul(h).ok_or_else(overflow)?;
  let chroma = w
    .div_ceil(2)
    .checked_mul(h.div_ceil(2))
    .and_then(|n| n.checked_mul(2))
    .ok_or_else(overflow)?;
  luma.checked_add(chroma).ok_or_else(overflow)
}

/// 借用的、已校验长度的 NV21 帧视图
#[derive(Debug, Clone, Copy)]
pub struct Nv21Frame<'a> {
  data: &'a [u8],
  width: usize,
  height: usize,
}

impl<'a> Nv21Frame<'a> {
  /// 构造帧视图；尺寸非正或缓冲区不足时返回 `InvalidInput`。
  ///
  /// 多余的尾部字节会被忽略。
  pub fn new(data: &'a [u8], width: i32, height: i32) -> Result<Self, ConvertError> {
    let expected = nv21_len(width, height)?;
    if data.len() < expected {
      return Err(ConvertError::invalid(format!(
        "缓冲区长度不足: 期望至少 {} 字节, 实际 {} 字节",
        expected,
        data.len()
      )));
    }

    Ok(Self {
      data: &data[..expected],
      width: width as usize,
      height: height as usize,
    })
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn luma(&self) -> &'a [u8] {
    &self.data[..self.width * self.height]
  }

  /// 色度平面（V/U 交错）
  pub fn chroma(&self) -> &'a [u8] {
    &self.data[self.width * self.height..]
  }

  pub fn as_bytes(&self) -> &'a [u8] {
    self.data
  }
}

/// 可获取 NV21 数据的帧
///
/// 数据已被释放（例如相机缓冲区已归还）时返回 `None`。
pub trait AsNv21Frame {
  fn as_nv21(&self) -> Option<&[u8]>;
  fn width(&self) -> i32;
  fn height(&self) -> i32;
}

/// 拥有数据的 NV21 帧
#[derive(Debug, Clone)]
pub struct Nv21Buffer {
  data: Option<Box<[u8]>>,
  width: i32,
  height: i32,
  index: u64,
}

impl Nv21Buffer {
  /// 从已打包的 NV21 数据创建帧，长度必须与尺寸相符
  pub fn new(data: Vec<u8>, width: i32, height: i32) -> Result<Self, ConvertError> {
    let expected = nv21_len(width, height)?;
    if data.len() != expected {
      return Err(ConvertError::invalid(format!(
        "数据长度不匹配: 期望长度 {}, 实际长度 {}",
        expected,
        data.len()
      )));
    }

    Ok(Self {
      data: Some(data.into_boxed_slice()),
      width,
      height,
      index: 0,
    })
  }

  /// 均匀颜色帧
  pub fn uniform(width: i32, height: i32, luma: u8, u: u8, v: u8) -> Result<Self, ConvertError> {
    let w = dimension("源宽度", width)?;
    let h = dimension("源高度", height)?;
    let mut data = vec![luma; nv21_len_unchecked(w, h)?];
    for cell in data[w * h..].chunks_exact_mut(2) {
      cell[0] = v;
      cell[1] = u;
    }
    Self::new(data, width, height)
  }

  pub fn with_index(mut self, index: u64) -> Self {
    self.index = index;
    self
  }

  pub fn index(&self) -> u64 {
    self.index
  }

  /// 释放底层数据，之后的读取将得到 `ResourceUnavailable`
  pub fn release(&mut self) -> Option<Box<[u8]>> {
    self.data.take()
  }

  pub fn is_released(&self) -> bool {
    self.data.is_none()
  }

  /// 获取帧视图
  pub fn frame(&self) -> Result<Nv21Frame<'_>, ConvertError> {
    let data = self
      .data
      .as_deref()
      .ok_or_else(|| ConvertError::unavailable(format!("第 {} 帧数据已释放", self.index)))?;
    Nv21Frame::new(data, self.width, self.height)
  }
}

impl AsNv21Frame for Nv21Buffer {
  fn as_nv21(&self) -> Option<&[u8]> {
    self.data.as_deref()
  }

  fn width(&self) -> i32 {
    self.width
  }

  fn height(&self) -> i32 {
    self.height
  }
}
