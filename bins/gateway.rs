use common::utils::logging::init_logging_json;
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // 加载 .env（允许使用 RUST_LOG 配置日志级别）
    dotenv().ok();
    // 使用统一的JSON结构化日志初始化
    init_logging_json();
    info!(service = "gateway", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    // 生成服务实例上下文（不含敏感信息）
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "gateway", event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "gateway", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    // 服务启动事件
    info!(
        service = "gateway",
        event = "start",
        %service_id,
        pid,
        version,
        config_path = "config.toml",
        "gateway service starting"
    );

    // 仅作为启动入口，将执行流程委托给 crates/gateway（内部处理 Ctrl+C）
    match rt.block_on(gateway::run()) {
        Ok(()) => {
            info!(service = "gateway", event = "stop", %service_id, pid, "gateway stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "gateway", event = "run_failed", error = %e, "gateway::run returned error");
            std::process::ExitCode::FAILURE
        }
    }
}
