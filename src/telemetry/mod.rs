pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

pub fn rss() -> LogCtx<ops::rss::Rss> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn videos() -> LogCtx<ops::videos::Videos> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn init() -> LogCtx<ops::init::Init> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn housekeeping() -> LogCtx<ops::housekeeping::Housekeeping> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
