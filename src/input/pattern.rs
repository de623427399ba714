// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/pattern.rs - 合成测试帧输入
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

//! 生成合成 NV21 帧，便于在没有相机时做基准测试。
//!
//! ```text
//! pattern://uniform?width=1280&height=720&luma=235&u=128&v=128&frames=100
//! pattern://bars?width=1280&height=720
//! ```

use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  error::ConvertError,
  frame::{Nv21Buffer, nv21_len},
  input::{FrameItem, InputError, query_param, required_param},
};

/// 彩条（Y, U, V）：白、黄、青、绿、品红、红、蓝、黑
const COLOR_BARS: [(u8, u8, u8); 8] = [
  (235, 128, 128),
  (210, 16, 146),
  (170, 166, 16),
  (145, 54, 34),
  (106, 202, 222),
  (81, 90, 240),
  (41, 240, 110),
  (16, 128, 128),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
  Uniform { luma: u8, u: u8, v: u8 },
  Bars,
}

pub struct PatternInput {
  pattern: Pattern,
  width: i32,
  height: i32,
  frames: Option<u64>,
  index: u64,
}

impl FromUrlWithScheme for PatternInput {
  const SCHEME: &'static str = "pattern";
}

impl FromUrl for PatternInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    InputError::check_scheme::<Self>(url)?;

    let width: i32 = required_param(url, "width")?;
    let height: i32 = required_param(url, "height")?;
    nv21_len(width, height)?;

    let pattern = match url.host_str().unwrap_or("uniform") {
      "bars" => Pattern::Bars,
      "uniform" | "" => Pattern::Uniform {
        luma: query_param(url, "luma")?.unwrap_or(128),
        u: query_param(url, "u")?.unwrap_or(128),
        v: query_param(url, "v")?.unwrap_or(128),
      },
      other => {
        return Err(InputError::InvalidParameter {
          name: "pattern",
          value: other.to_string(),
        });
      }
    };
    // frames=0 表示无限
    let frames = match query_param::<u64>(url, "frames")?.unwrap_or(1) {
      0 => None,
      n => Some(n),
    };

    info!("合成输入: {:?} {}x{}, 帧数 {:?}", pattern, width, height, frames);
    Ok(PatternInput {
      pattern,
      width,
      height,
      frames,
      index: 0,
    })
  }
}

impl PatternInput {
  /// `frames` 为 `None` 或 `Some(0)` 时无限产出帧，与 URL 参数 `frames=0` 一致
  pub fn new(pattern: Pattern, width: i32, height: i32, frames: Option<u64>) -> Self {
    Self {
      pattern,
      width,
      height,
      frames: frames.filter(|&n| n > 0),
      index: 0,
    }
  }

  pub fn width(&self) -> i32 {
    self.width
  }

  pub fn height(&self) -> i32 {
    self.height
  }

  fn render(&self) -> Result<Nv21Buffer, ConvertError> {
    match self.pattern {
      Pattern::Uniform { luma, u, v } => Nv21Buffer::uniform(self.width, self.height, luma, u, v),
      Pattern::Bars => {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut data = vec![0u8; nv21_len(self.width, self.height)?];
        let bar = |x: usize| COLOR_BARS[x * COLOR_BARS.len() / w];

        let (luma, chroma) = data.split_at_mut(w * h);
        for row in luma.chunks_exact_mut(w) {
          for (x, value) in row.iter_mut().enumerate() {
            *value = bar(x).0;
          }
        }
        for row in chroma.chunks_exact_mut(w.div_ceil(2) * 2) {
          for (cx, cell) in row.chunks_exact_mut(2).enumerate() {
            let (_, u, v) = bar((cx * 2).min(w - 1));
            cell[0] = v;
            cell[1] = u;
          }
        }
        Nv21Buffer::new(data, self.width, self.height)
      }
    }
  }
}

impl Iterator for PatternInput {
  type Item = FrameItem;

  fn next(&mut self) -> Option<Self::Item> {
    if self.frames.is_some_and(|n| self.index >= n) {
      return None;
    }
    let index = self.index;
    self.index += 1;
    Some(self.render().map(|b| b.with_index(index)))
  }
}
