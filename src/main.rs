/*
 * Responsibility
 * - app::run() の呼び出し（ロジックは置かない）
 */
use anyhow::Result;

mod app;
mod cli;

fn main() -> Result<()> {
    app::run()
}
