use crate::domain::{CourierStatus, Gender, KitType, ModuleKind};
use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "godown")]
#[command(about = "Local-first office stock & operations ledger", long_about = None)]
pub struct Cli {
    /// Override Godown home directory (config/data subdirs will be created inside it).
    #[arg(long, env = "GODOWN_HOME")]
    pub home: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Kit stock, one running balance per item.
    Kit(KitArgs),
    /// Game stock, one running balance per game.
    Game(GameArgs),
    /// Blazer office stock per gender and size.
    Blazer(BlazerArgs),
    /// Daily expenses against the monthly pool.
    Expense(ExpenseArgs),
    /// Book distribution to schools.
    Book(BookArgs),
    /// Courier shipments.
    Courier(CourierArgs),
    /// Change trail for every write.
    Log(LogArgs),
    /// Show or update the operator identity.
    Login(LoginArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ListFlags {
    /// Case-insensitive substring match across the module's text fields.
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long, value_enum, default_value = "table")]
    pub format: ListFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Table,
    Tsv,
}

#[derive(Debug, Args)]
pub struct KitArgs {
    #[command(subcommand)]
    pub cmd: KitCmd,
}

#[derive(Debug, Subcommand)]
pub enum KitCmd {
    /// Record a stock movement for an item.
    Add {
        item: String,

        /// Entry date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Override the carried opening balance.
        #[arg(long)]
        opening: Option<i64>,

        #[arg(long = "add-in", default_value_t = 0)]
        add_in: i64,

        #[arg(long = "take-out", default_value_t = 0)]
        take_out: i64,

        #[arg(long)]
        remarks: Option<String>,
    },
    /// Edit a stored row. Balance fields recompute the closing balance;
    /// later rows for the item keep their stored balances.
    Edit {
        id: Uuid,

        #[arg(long)]
        item: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        opening: Option<i64>,

        #[arg(long = "add-in")]
        add_in: Option<i64>,

        #[arg(long = "take-out")]
        take_out: Option<i64>,

        #[arg(long)]
        remarks: Option<String>,
    },
    Rm {
        id: Uuid,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    List {
        #[command(flatten)]
        list: ListFlags,

        /// Only rows for this item.
        #[arg(long)]
        item: Option<String>,
    },
    /// Distinct item names seen so far.
    Items,
    Stats,
    Export {
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct GameArgs {
    #[command(subcommand)]
    pub cmd: GameCmd,
}

#[derive(Debug, Subcommand)]
pub enum GameCmd {
    /// Record a stock movement for a game.
    Add {
        game: String,

        /// Override the carried previous stock.
        #[arg(long)]
        previous: Option<i64>,

        #[arg(long, default_value_t = 0)]
        adding: i64,

        #[arg(long, default_value_t = 0)]
        sent: i64,

        #[arg(long = "sent-by")]
        sent_by: Option<String>,
    },
    Edit {
        id: Uuid,

        #[arg(long)]
        game: Option<String>,

        #[arg(long)]
        previous: Option<i64>,

        #[arg(long)]
        adding: Option<i64>,

        #[arg(long)]
        sent: Option<i64>,

        #[arg(long = "sent-by")]
        sent_by: Option<String>,
    },
    Rm {
        id: Uuid,

        #[arg(long)]
        yes: bool,
    },
    List {
        #[command(flatten)]
        list: ListFlags,

        #[arg(long)]
        game: Option<String>,
    },
    /// Distinct game names seen so far.
    Names,
    Stats,
    Export {
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct BlazerArgs {
    #[command(subcommand)]
    pub cmd: BlazerCmd,
}

#[derive(Debug, Subcommand)]
pub enum BlazerCmd {
    /// Record a received or sent movement for a gender+size bucket.
    Add {
        #[arg(long, value_enum)]
        gender: Gender,

        /// Catalog size. Bare forms like "40" or "XL" get the gender prefix.
        #[arg(long)]
        size: String,

        /// Count received into the office.
        #[arg(long, conflicts_with = "sent")]
        received: Option<i64>,

        /// Count sent out of the office.
        #[arg(long)]
        sent: Option<i64>,

        /// Set the resulting office stock explicitly instead of deriving it.
        #[arg(long)]
        stock: Option<i64>,

        #[arg(long)]
        remarks: Option<String>,
    },
    /// Edit a stored movement. Quantity changes re-derive the office stock
    /// from the next-older row of the bucket.
    Edit {
        id: Uuid,

        #[arg(long, value_enum)]
        gender: Option<Gender>,

        #[arg(long)]
        size: Option<String>,

        #[arg(long, conflicts_with = "sent")]
        received: Option<i64>,

        #[arg(long)]
        sent: Option<i64>,

        #[arg(long)]
        stock: Option<i64>,

        #[arg(long)]
        remarks: Option<String>,
    },
    Rm {
        id: Uuid,

        #[arg(long)]
        yes: bool,
    },
    List {
        #[command(flatten)]
        list: ListFlags,

        #[arg(long, value_enum)]
        gender: Option<Gender>,

        #[arg(long)]
        size: Option<String>,
    },
    Stats,
    Export {
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct ExpenseArgs {
    #[command(subcommand)]
    pub cmd: ExpenseCmd,
}

#[derive(Debug, Subcommand)]
pub enum ExpenseCmd {
    /// Record a day's spending (or a pool top-up with --fixed).
    Add {
        /// What the money went to.
        #[arg(long)]
        remarks: String,

        /// Entry date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Amount spent.
        #[arg(long, default_value = "0")]
        amount: String,

        /// Pool top-up recorded with this entry.
        #[arg(long)]
        fixed: Option<String>,

        /// Overspend carried over from the previous month.
        #[arg(long)]
        carryover: Option<String>,
    },
    Edit {
        id: Uuid,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        amount: Option<String>,

        #[arg(long, conflicts_with = "clear_fixed")]
        fixed: Option<String>,

        /// Drop the stored fixed amount from this entry.
        #[arg(long)]
        clear_fixed: bool,

        #[arg(long, conflicts_with = "clear_carryover")]
        carryover: Option<String>,

        /// Drop the stored carryover from this entry.
        #[arg(long)]
        clear_carryover: bool,

        #[arg(long)]
        remarks: Option<String>,
    },
    Rm {
        id: Uuid,

        #[arg(long)]
        yes: bool,
    },
    List {
        #[command(flatten)]
        list: ListFlags,

        /// Only entries dated in this month (YYYY-MM).
        #[arg(long)]
        month: Option<String>,
    },
    /// Monthly pool: fixed amounts, carryover, spending, remaining balance.
    Stats {
        /// Month to aggregate (YYYY-MM). Defaults to the current month.
        #[arg(long)]
        month: Option<String>,
    },
    Export {
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct BookArgs {
    #[command(subcommand)]
    pub cmd: BookCmd,
}

#[derive(Debug, Subcommand)]
pub enum BookCmd {
    /// Record a distribution to a school. The total always comes from the
    /// per-grade counts.
    Add {
        #[arg(long)]
        school: String,

        #[arg(long)]
        coordinator: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long = "kit-type", value_enum, default_value = "lab")]
        kit_type: KitType,

        #[arg(long, default_value_t = 0)]
        ordered: i64,

        #[arg(long, default_value_t = 0)]
        received: i64,

        #[arg(long = "delivery-date")]
        delivery_date: Option<String>,

        /// Per-grade counts like grade7iot=5. Repeatable.
        #[arg(long = "grade")]
        grades: Vec<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    Edit {
        id: Uuid,

        #[arg(long)]
        school: Option<String>,

        #[arg(long)]
        coordinator: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long = "kit-type", value_enum)]
        kit_type: Option<KitType>,

        #[arg(long)]
        ordered: Option<i64>,

        #[arg(long)]
        received: Option<i64>,

        #[arg(long = "delivery-date")]
        delivery_date: Option<String>,

        /// Per-grade counts to overwrite, like grade7iot=5. Repeatable;
        /// the total is recomputed from the merged grades.
        #[arg(long = "grade")]
        grades: Vec<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    Rm {
        id: Uuid,

        #[arg(long)]
        yes: bool,
    },
    List {
        #[command(flatten)]
        list: ListFlags,

        #[arg(long)]
        school: Option<String>,
    },
    Stats,
    Export {
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct CourierArgs {
    #[command(subcommand)]
    pub cmd: CourierCmd,
}

#[derive(Debug, Subcommand)]
pub enum CourierCmd {
    Add {
        /// Recipient name.
        #[arg(long)]
        name: String,

        #[arg(long)]
        tracking: String,

        /// What was shipped.
        #[arg(long)]
        details: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        address: String,

        /// Dispatch date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        #[arg(long = "delivery-date")]
        delivery_date: Option<String>,

        #[arg(long, value_enum, default_value = "dispatched")]
        status: CourierStatus,
    },
    Edit {
        id: Uuid,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        tracking: Option<String>,

        #[arg(long)]
        details: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long = "delivery-date")]
        delivery_date: Option<String>,

        #[arg(long, value_enum)]
        status: Option<CourierStatus>,
    },
    Rm {
        id: Uuid,

        #[arg(long)]
        yes: bool,
    },
    List {
        #[command(flatten)]
        list: ListFlags,

        #[arg(long, value_enum)]
        status: Option<CourierStatus>,
    },
    Stats,
    Export {
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct LogArgs {
    #[command(subcommand)]
    pub cmd: LogCmd,
}

#[derive(Debug, Subcommand)]
pub enum LogCmd {
    List {
        #[arg(long, value_enum)]
        module: Option<ModuleKind>,

        #[arg(long)]
        last: Option<u32>,
    },
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Set the operator name recorded on new rows.
    #[arg(long)]
    pub name: Option<String>,
}
