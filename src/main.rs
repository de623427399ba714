// 该文件是 Shanan （山南西风） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use shanan_nv21::{
  FromUrl, FrameConverter,
  input::InputWrapper,
  output::OutputWrapper,
  task::{ContinuousTask, OneShotTask, RepeatShotTask, Task},
};

use args::{Args, Mode};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);
  info!("目标尺寸: {}x{}", args.width, args.height);

  let converter = FrameConverter::new(args.width, args.height)?;
  let input = InputWrapper::from_url(&args.input)?;
  info!("输入源已打开: {}x{}", input.width(), input.height());
  let output = OutputWrapper::from_url(&args.output)?;

  let summary = match args.mode {
    Mode::Oneshot => OneShotTask.run_task(input, &converter, output)?,
    Mode::Repeatshot => RepeatShotTask::default()
      .with_repeat(args.repeat)
      .run_task(input, &converter, output)?,
    Mode::Continueshot => {
      let frame_number = (args.frame_number > 0).then_some(args.frame_number);
      ContinuousTask::default()
        .with_frame_number(frame_number)
        .with_drop_frames(!args.no_drop)
        .run_task(input, &converter, output)?
    }
  };

  info!(
    "处理完成: 转换 {} 帧, 丢弃 {} 帧, 不可用 {} 帧",
    summary.converted, summary.dropped, summary.unavailable
  );

  Ok(())
}
