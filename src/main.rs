use catering_console::api::DEFAULT_REVENUE_DAYS;
use catering_console::models::{Order, Settings};
use catering_console::summary::{self, CHART_HEIGHT};
use catering_console::utils::{format_created_at, format_money};
use catering_console::{load_config, ConsoleApi, OrderBoard, OrderQuery, OrderStatus};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct OrderRowExport {
    id: String,
    created: String,
    customer: String,
    phone: String,
    event: String,
    guests: u32,
    items: usize,
    total: String,
    status: String,
}

fn order_to_export(order: &Order) -> OrderRowExport {
    OrderRowExport {
        id: order.id.clone(),
        created: format_created_at(&order.created_at),
        customer: order.customer_name.clone(),
        phone: order.phone_number.clone(),
        event: format!("{} {}", order.event_date, order.event_time)
            .trim()
            .to_string(),
        guests: order.guest_count,
        items: order.item_count(),
        total: format!("{} {}", order.currency, format_money(order.grand_total, 2)),
        status: order.status.to_string(),
    }
}

#[derive(Serialize)]
struct OrdersPageExport {
    page: usize,
    total_pages: usize,
    total_orders: usize,
    revenue: String,
    by_status: Vec<(String, usize)>,
    rows: Vec<OrderRowExport>,
}

#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    token: Option<String>,
    flags: Vec<(String, String)>,
    positional: Vec<String>,
}

impl Args {
    fn flag(&self, name: &str) -> Option<&str> {
        self.flags
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut args = Args::default();
    let mut i = 0;
    while i < raw.len() {
        let arg = &raw[i];
        if let Some(name) = arg.strip_prefix("--") {
            i += 1;
            let value = raw
                .get(i)
                .ok_or_else(|| format!("--{} requires a value", name))?
                .clone();
            match name {
                "config" => args.config = Some(PathBuf::from(value)),
                "token" => args.token = Some(value),
                _ => args.flags.push((name.to_string(), value)),
            }
        } else {
            args.positional.push(arg.clone());
        }
        i += 1;
    }
    Ok(args)
}

fn print_usage(bin: &str) {
    eprintln!("Usage:");
    eprintln!("  {} [--config <path>] [--token <token>] <command> [args]", bin);
    eprintln!();
    eprintln!("  Commands:");
    eprintln!("    orders [--search Q] [--status S|all] [--sort COL[:asc|desc]] [--page N]");
    eprintln!("    order <id>");
    eprintln!("    set-status <id> <Confirmed|Preparing|Ready|Delivered|Cancelled|Pending>");
    eprintln!("    dashboard [--day D]");
    eprintln!("    revenue [--days N]");
    eprintln!("    customers");
    eprintln!("    settings");
    eprintln!("    set-branding [--app-name NAME] [--tagline TEXT]");
    eprintln!("    upload-logo <file>");
    eprintln!("    me");
    eprintln!("    login <email> <password>");
    eprintln!("    register <name> <email> <password>");
    eprintln!();
    eprintln!("  Sort columns: createdAt, customerName, grandTotal, id");
    eprintln!("  Env: CATERING_API_URL, CATERING_TOKEN, RUST_LOG");
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let raw_args: Vec<String> = std::env::args().collect();
    let bin = raw_args
        .first()
        .cloned()
        .unwrap_or_else(|| "catering-console".to_string());

    let args = match parse_args(raw_args.get(1..).unwrap_or_default()) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}", e);
            print_usage(&bin);
            std::process::exit(1);
        }
    };

    let Some(command) = args.positional.first().cloned() else {
        print_usage(&bin);
        std::process::exit(1);
    };

    let token = args
        .token
        .clone()
        .or_else(|| std::env::var("CATERING_TOKEN").ok());
    let config = load_config(args.config.as_deref())?
        .with_overrides(std::env::var("CATERING_API_URL").ok(), token);
    let api = config.client();
    let rest = &args.positional[1..];

    match (command.as_str(), rest) {
        ("orders", []) => list_orders(&api, &args).await?,
        ("order", [id]) => show_order(&api, id).await?,
        ("set-status", [id, status]) => set_status(&api, id, status).await?,
        ("dashboard", []) => {
            let dashboard = summary::load_dashboard(&api, args.flag("day")).await;
            let rows = summary::recent_order_rows(&dashboard);
            print_json(&serde_json::json!({
                "day": dashboard.day,
                "total_orders_today": dashboard.total_orders_today,
                "total_revenue_today": format_money(dashboard.total_revenue_today, 2),
                "upcoming_events": dashboard.upcoming_events,
                "pending_orders": dashboard.pending_orders,
                "recent_orders": rows,
            }))?;
        }
        ("revenue", []) => {
            let days = match args.flag("days") {
                Some(d) => d
                    .parse::<u32>()
                    .unwrap_or_else(|_| fail(format!("invalid --days '{}'", d))),
                None => DEFAULT_REVENUE_DAYS,
            };
            let revenue = summary::load_revenue(&api, days)
                .await
                .unwrap_or_else(|e| fail(e));
            print_json(&serde_json::json!({
                "range": revenue.date_label(),
                "total_revenue": format_money(revenue.total_revenue, 2),
                "avg_order_value": format_money(revenue.avg_order_value, 2),
                "highest_order": format_money(revenue.highest_order, 2),
                "chart": revenue.chart_bars(CHART_HEIGHT),
                "channels": revenue.channel_shares(),
                "top_items": revenue.top_items,
            }))?;
        }
        ("customers", []) => {
            let customers = summary::load_customers(&api)
                .await
                .unwrap_or_else(|e| fail(e));
            let rows: Vec<serde_json::Value> = customers
                .sorted_customers()
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "name": c.name,
                        "phone": c.phone,
                        "orders": c.order_count,
                        "total_spend": format_money(c.total_spend, 2),
                        "avg_order_value": format_money(c.avg_order_value(), 2),
                    })
                })
                .collect();
            print_json(&serde_json::json!({
                "total_customers": customers.total_customers,
                "total_spend": format_money(customers.total_spend, 0),
                "avg_spend_per_customer": format_money(customers.avg_spend_per_customer, 0),
                "top_customer": customers.top_customer_first_name(),
                "customers": rows,
            }))?;
        }
        ("settings", []) => print_json(&api.settings().await.unwrap_or_else(|e| fail(e)))?,
        ("set-branding", []) => {
            let mut patch = Settings::default();
            let branding = patch.branding.get_or_insert_with(Default::default);
            branding.app_name = args.flag("app-name").map(String::from);
            branding.tagline = args.flag("tagline").map(String::from);
            let stored = api.update_settings(&patch).await.unwrap_or_else(|e| fail(e));
            print_json(&stored)?;
        }
        ("upload-logo", [file]) => {
            let upload = api
                .upload_logo(std::path::Path::new(file))
                .await
                .unwrap_or_else(|e| fail(e));
            print_json(&upload)?;
        }
        ("me", []) => print_json(&api.me().await.unwrap_or_else(|e| fail(e)))?,
        ("login", [email, password]) => {
            let session = api.login(email, password).await.unwrap_or_else(|e| fail(e));
            print_json(&session)?;
        }
        ("register", [name, email, password]) => {
            let user = api
                .register(name, email, password)
                .await
                .unwrap_or_else(|e| fail(e));
            eprintln!("Registered {}. Log in to continue.", email);
            if let Some(user) = user {
                print_json(&user)?;
            }
        }
        (other, _) => {
            eprintln!("Unknown command or wrong arguments: '{}'", other);
            print_usage(&bin);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn build_query(args: &Args) -> OrderQuery {
    let mut query = OrderQuery::default();
    if let Some(search) = args.flag("search") {
        query.set_search(search);
    }
    if let Some(status) = args.flag("status") {
        query.set_status(status.parse().unwrap_or_else(|e| fail(e)));
    }
    if let Some(sort) = args.flag("sort") {
        query.sort = sort.parse().unwrap_or_else(|e| fail(e));
    }
    if let Some(page) = args.flag("page") {
        let page = page
            .parse::<usize>()
            .unwrap_or_else(|_| fail(format!("invalid --page '{}'", page)));
        query.set_page(page);
    }
    query
}

async fn load_board(api: &ConsoleApi) -> OrderBoard {
    let mut board = OrderBoard::new();
    eprintln!("Fetching orders from {}...", api.api_url());
    if let Err(e) = board.refresh(api).await {
        fail(format!("{}: {}", board.error().unwrap_or("Failed to load orders"), e));
    }
    board
}

async fn list_orders(api: &ConsoleApi, args: &Args) -> anyhow::Result<()> {
    let query = build_query(args);
    let board = load_board(api).await;
    let view = board.view(&query);

    let export = OrdersPageExport {
        page: view.page,
        total_pages: view.total_pages,
        total_orders: view.kpis.total_orders,
        revenue: format_money(view.kpis.revenue, 2),
        by_status: OrderStatus::ALL
            .iter()
            .map(|s| (s.to_string(), view.kpis.count(*s)))
            .collect(),
        rows: view.rows().iter().map(|o| order_to_export(o)).collect(),
    };
    print_json(&export)
}

async fn show_order(api: &ConsoleApi, id: &str) -> anyhow::Result<()> {
    let mut board = load_board(api).await;
    let order = board.open_detail(id).unwrap_or_else(|e| fail(e));
    print_json(order)
}

async fn set_status(api: &ConsoleApi, id: &str, status: &str) -> anyhow::Result<()> {
    let status: OrderStatus = status.parse().unwrap_or_else(|e| fail(e));
    let mut board = load_board(api).await;
    board
        .update_status(api, id, status)
        .await
        .unwrap_or_else(|e| fail(e));
    eprintln!("Order {} set to {}", id, status);
    match board.find(id) {
        Some(order) => print_json(&order_to_export(order)),
        None => Ok(()),
    }
}
