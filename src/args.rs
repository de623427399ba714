// 该文件是 Shanan （山南西风） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::{Parser, ValueEnum};
use url::Url;

use shanan_nv21::DEFAULT_TARGET_SIZE;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
  /// 只转换第一帧
  Oneshot,
  /// 对第一帧重复转换，统计平均耗时
  Repeatshot,
  /// 连续转换帧流
  Continueshot,
}

/// Shanan NV21 预处理参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源
  /// 支持格式:
  /// - 原始 NV21 文件: nv21:///path/frames.yuv?width=1280&height=720
  /// - 合成帧: pattern://bars?width=1280&height=720&frames=100
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出路径
  /// 支持格式:
  /// - 张量文件: tensor:///path/frame.f32[?per_frame]
  /// - 预览图: image:///path/preview.png
  /// - 目录记录: folder:///path/record[?preview]
  /// - 丢弃: null://
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  /// 目标宽度
  #[arg(long, default_value_t = DEFAULT_TARGET_SIZE, value_name = "WIDTH")]
  pub width: i32,

  /// 目标高度
  #[arg(long, default_value_t = DEFAULT_TARGET_SIZE, value_name = "HEIGHT")]
  pub height: i32,

  /// 运行模式
  #[arg(long, value_enum, default_value_t = Mode::Oneshot)]
  pub mode: Mode,

  /// 重复次数（仅 repeatshot）
  #[arg(long, default_value_t = 1000, value_name = "COUNT")]
  pub repeat: usize,

  /// 最大处理帧数（仅 continueshot，0 表示无限制）
  #[arg(long, default_value_t = 0, value_name = "FRAME_NUMBER")]
  pub frame_number: usize,

  /// 转换跟不上时不丢帧（仅 continueshot）
  #[arg(long)]
  pub no_drop: bool,
}
