// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/raw_file.rs - 原始 NV21 文件输入
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

//! 读取由若干 NV21 帧首尾相接组成的原始文件。
//!
//! ```text
//! nv21:///path/to/frames.yuv?width=1280&height=720
//! ```

use std::{
  fs::File,
  path::PathBuf,
  io::{BufReader, ErrorKind, Read},
};

use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  error::ConvertError,
  frame::{Nv21Buffer, nv21_len},
  input::{FrameItem, InputError, required_param},
  url_path,
};

pub struct RawFileInput {
  path: PathBuf,
  reader: BufReader<File>,
  width: i32,
  height: i32,
  frame_len: usize,
  index: u64,
  finished: bool,
}

impl FromUrlWithScheme for RawFileInput {
  const SCHEME: &'static str = "nv21";
}

impl FromUrl for RawFileInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    InputError::check_scheme::<Self>(url).inspect_err(|e| error!("{}", e))?;

    let width: i32 = required_param(url, "width")?;
    let height: i32 = required_param(url, "height")?;
    let frame_len = nv21_len(width, height)?;

    let path = url_path(url)?;
    info!("打开 NV21 文件: {} ({}x{})", path.display(), width, height);
    let file = File::open(&path)?;
    debug!("单帧大小: {} 字节", frame_len);

    Ok(RawFileInput {
      path,
      reader: BufReader::new(file),
      width,
      height,
      frame_len,
      index: 0,
      finished: false,
    })
  }
}

impl RawFileInput {
  pub fn width(&self) -> i32 {
    self.width
  }

  pub fn height(&self) -> i32 {
    self.height
  }

  /// 读取一整帧；文件结束返回 `Ok(None)`，帧不完整返回 `UnexpectedEof`
  fn read_frame(&mut self) -> std::io::Result<Option<Vec<u8>>> {
    let mut data = vec![0u8; self.frame_len];
    let mut filled = 0;
    while filled < data.len() {
      match self.reader.read(&mut data[filled..]) {
        Ok(0) => break,
        Ok(n) => filled += n,
        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
        Err(e) => return Err(e),
      }
    }

    match filled {
      0 => Ok(None),
      n if n == self.frame_len => Ok(Some(data)),
      n => Err(std::io::Error::new(
        ErrorKind::UnexpectedEof,
        format!("帧不完整: 期望 {} 字节, 实际 {} 字节", self.frame_len, n),
      )),
    }
  }
}

impl Iterator for RawFileInput {
  type Item = FrameItem;

  fn next(&mut self) -> Option<Self::Item> {
    if self.finished {
      return None;
    }

    let index = self.index;
    match self.read_frame() {
      Ok(Some(data)) => {
        self.index += 1;
        Some(Nv21Buffer::new(data, self.width, self.height).map(|b| b.with_index(index)))
      }
      Ok(None) => {
        info!("文件 {} 读取完毕, 共 {} 帧", self.path.display(), index);
        self.finished = true;
        None
      }
      Err(e) => {
        warn!("读取第 {} 帧失败: {}", index, e);
        self.finished = true;
        Some(Err(ConvertError::unavailable(format!(
          "{} 第 {} 帧: {}",
          self.path.display(),
          index,
          e
        ))))
      }
    }
  }
}
