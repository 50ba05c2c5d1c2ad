use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use emu_menu::menus::{default_resources, MAIN_MENU};
use emu_menu::table::DEFAULT_CAPACITY;
use emu_menu::{
    build_menu, Accelerator, Action, ActionMap, BindingTable, HeadlessToolkit, HeadlessWidget,
    HotkeyProfile, ItemKind, MenuRegistry, MenuWidget, Resources, WindowId,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hemu-keys", about = "Inspect and edit emulator menu hotkeys")]
struct Args {
    /// Hotkey profile to load and update (defaults to hotkeys.json next to the executable)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Resource file providing the checked state of menu items
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Also build the secondary window, as dual-display machines do
    #[arg(long, default_value_t = false)]
    dual: bool,

    /// Maximum number of menu bindings; 0 means unbounded
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List hotkeys
    List {
        #[arg(long, value_enum, default_value_t = WindowArg::Primary)]
        window: WindowArg,
        /// Include actions without a hotkey
        #[arg(long, default_value_t = false)]
        all: bool,
        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the menu tree of a window
    Menu {
        #[arg(long, value_enum, default_value_t = WindowArg::Primary)]
        window: WindowArg,
    },
    /// Bind an action to a key combination, e.g. `bind pause-toggle Ctrl+Shift+P`
    Bind {
        action: String,
        accel: String,
        #[arg(long, value_enum, default_value_t = WindowArg::Primary)]
        window: WindowArg,
    },
    /// Remove the hotkey of an action
    Unbind { action: String },
    /// Remove all hotkeys
    Clear,
    /// Restore the default hotkeys
    Defaults,
    /// Resolve a key combination and run its action
    Press {
        accel: String,
        #[arg(long, value_enum, default_value_t = WindowArg::Primary)]
        window: WindowArg,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WindowArg {
    Primary,
    Secondary,
}

impl From<WindowArg> for WindowId {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Primary => WindowId::Primary,
            WindowArg::Secondary => WindowId::Secondary,
        }
    }
}

#[derive(Serialize)]
struct ListEntry {
    action: &'static str,
    hotkey: String,
    label: String,
    window: String,
}

struct Session {
    registry: MenuRegistry<HeadlessWidget>,
    toolkit: HeadlessToolkit,
    profile_path: PathBuf,
}

impl Session {
    fn open(args: &Args) -> Result<Self> {
        let mut resources = default_resources();
        let res_path = args.resources.clone().unwrap_or_else(Resources::config_path);
        if res_path.exists() {
            let applied = resources
                .load_from(&res_path)
                .with_context(|| format!("Failed to read resources from {}", res_path.display()))?;
            log::debug!("Loaded {} resources from {}", applied, res_path.display());
        }

        let capacity = (args.capacity > 0).then_some(args.capacity);
        let mut registry = MenuRegistry::with_table(BindingTable::with_capacity(capacity));
        let mut toolkit = HeadlessToolkit::new();

        let mut windows = vec![WindowId::Primary];
        if args.dual {
            windows.push(WindowId::Secondary);
        }
        for window in windows {
            build_menu(&mut registry, &mut toolkit, &resources, window, MAIN_MENU)
                .with_context(|| format!("Failed to build the {} window menu", window))?;
        }

        let profile_path = args.profile.clone().unwrap_or_else(HotkeyProfile::config_path);
        let profile = HotkeyProfile::load_or_default(&profile_path);
        profile
            .apply(&mut registry)
            .with_context(|| format!("Invalid hotkey profile {}", profile_path.display()))?;

        Ok(Self {
            registry,
            toolkit,
            profile_path,
        })
    }

    fn window(&self, arg: WindowArg) -> Result<WindowId> {
        let window = WindowId::from(arg);
        if !self.registry.is_open(window) {
            bail!("The {} window is not open (use --dual)", window);
        }
        Ok(window)
    }

    fn save(&self) -> Result<()> {
        let profile = HotkeyProfile::capture(&self.registry, WindowId::Primary);
        profile
            .save(&self.profile_path)
            .with_context(|| format!("Failed to save {}", self.profile_path.display()))?;
        log::info!("Saved hotkeys to {}", self.profile_path.display());
        Ok(())
    }
}

fn parse_action(name: &str) -> Result<Action> {
    match Action::from_name(name) {
        Some(action) if !action.is_none() => Ok(action),
        _ => bail!("Unknown action: {}", name),
    }
}

fn parse_accel(text: &str) -> Result<Accelerator> {
    text.parse::<Accelerator>()
        .with_context(|| format!("Invalid key combination: {}", text))
}

fn list(session: &Session, window: WindowId, all: bool, json: bool) -> Result<()> {
    let entries: Vec<ListEntry> = session
        .registry
        .table()
        .window_bindings(window)
        .filter(|b| !b.action().is_none())
        .filter(|b| all || b.accelerator().is_set())
        .map(|b| ListEntry {
            action: b.action().name(),
            hotkey: b.accelerator().to_string(),
            label: b.declaration().display_label(),
            window: window.to_string(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        println!("{:<24} {:<18} {}", entry.action, entry.hotkey, entry.label);
    }
    Ok(())
}

fn print_menu(items: &[HeadlessWidget], depth: usize) {
    for item in items {
        let decl = item.declaration();
        let indent = "  ".repeat(depth);
        if decl.kind == ItemKind::Separator {
            println!("{}----", indent);
            continue;
        }
        let mark = match decl.kind {
            ItemKind::Check if item.is_active() => "[x] ",
            ItemKind::Check => "[ ] ",
            ItemKind::RadioInt(_) | ItemKind::RadioStr(_) if item.is_active() => "(*) ",
            ItemKind::RadioInt(_) | ItemKind::RadioStr(_) => "( ) ",
            _ => "",
        };
        let mut line = format!("{}{}{}", indent, mark, item.label());
        if item.accel_label().is_set() {
            line.push_str(&format!("\t{}", item.accel_label()));
        }
        if !item.is_sensitive() {
            line.push_str(" (disabled)");
        }
        println!("{}", line);
        print_menu(&item.children(), depth + 1);
    }
}

fn press(session: &mut Session, accel: Accelerator, window: WindowId) -> Result<bool> {
    let Some(action) = session.registry.resolve(accel, window) else {
        bail!("{} is not bound in the {} window", accel, window);
    };

    let mut actions = ActionMap::new();
    for &action in Action::all() {
        actions.register(action, move |ctx| {
            println!(
                "{} ({} window{})",
                action,
                ctx.window,
                if ctx.unlocked { ", unlocked" } else { "" }
            );
        });
    }
    session.registry.activate(accel, window, &mut actions);

    // Hotkey editor actions act on the registry itself
    match action {
        Action::HotkeysClear => session.registry.reset_hotkeys(),
        Action::HotkeysDefault => session.registry.restore_default_hotkeys(),
        _ => return Ok(false),
    }
    Ok(true)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut session = Session::open(&args)?;

    let modified = match args.command {
        Command::List { window, all, json } => {
            let window = session.window(window)?;
            list(&session, window, all, json)?;
            false
        }
        Command::Menu { window } => {
            let window = session.window(window)?;
            print_menu(session.toolkit.menu_bar(window), 0);
            false
        }
        Command::Bind {
            ref action,
            ref accel,
            window,
        } => {
            let action = parse_action(action)?;
            let accel = parse_accel(accel)?;
            let window = session.window(window)?;
            let report = session.registry.rebind_by_action(action, window, accel);
            if let Some(Err(e)) = report.origin() {
                bail!("Cannot bind {}: {}", action, e);
            }
            for (other, e) in report.failures() {
                eprintln!("warning: {} window: {}", other, e);
            }
            println!("{} -> {}", action, accel);
            true
        }
        Command::Unbind { ref action } => {
            let action = parse_action(action)?;
            let report = session
                .registry
                .rebind_by_action(action, WindowId::Primary, Accelerator::NONE);
            if let Some(Err(e)) = report.origin() {
                bail!("Cannot unbind {}: {}", action, e);
            }
            true
        }
        Command::Clear => {
            session.registry.reset_hotkeys();
            true
        }
        Command::Defaults => {
            session.registry.restore_default_hotkeys();
            true
        }
        Command::Press { ref accel, window } => {
            let accel = parse_accel(accel)?;
            let window = session.window(window)?;
            press(&mut session, accel, window)?
        }
    };

    if modified {
        session.save()?;
    }
    Ok(())
}
