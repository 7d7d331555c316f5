//! Line-oriented command dispatch for the interactive prompt.
//!
//! Each line is one command; failures are printed and the prompt
//! continues. Only `exit`/`quit` (or end of input) end the session.

use std::path::Path;

use sp_compose::{AnnotationPosition, RenderAdapter};
use sp_core::{Error, Result};
use sp_session::{
    HistogramSource, JsonDirectorySource, JsonFrameAdapter, RebinSpec, Session, MAX_GRID_COLS,
    MAX_GRID_ROWS,
};

/// The session type the binary drives.
pub type PlotSession = Session<JsonDirectorySource, JsonFrameAdapter>;

/// Whether the prompt keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Keep reading commands.
    Continue,
    /// Leave the prompt.
    Quit,
}

/// Parse and run one command line. Errors are reported on stderr and
/// never end the session.
pub fn dispatch<S: HistogramSource, A: RenderAdapter>(
    line: &str,
    session: &mut Session<S, A>,
) -> CommandOutcome {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return CommandOutcome::Continue;
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    match run_command(command, rest, &args, session) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {e}");
            CommandOutcome::Continue
        }
    }
}

fn run_command<S: HistogramSource, A: RenderAdapter>(
    command: &str,
    rest: &str,
    args: &[&str],
    session: &mut Session<S, A>,
) -> Result<CommandOutcome> {
    match command {
        "exit" | "quit" => return Ok(CommandOutcome::Quit),
        "help" => print_help(),
        "selection" => session.selection(require_arg(args, 0, "selection <name>")?),
        "create_grid" => {
            let usage = "create_grid <cols> <rows>";
            let cols = parse_usize(require_arg(args, 0, usage)?)?;
            let rows = parse_usize(require_arg(args, 1, usage)?)?;
            session.create_grid(cols, rows)?;
            println!("grid {cols}x{rows} ready, panel 0 active");
        }
        "activate_panel" => {
            let index = parse_usize(require_arg(args, 0, "activate_panel <index>")?)?;
            session.activate_panel(index)?;
            println!("panel {index} active");
        }
        "load" => {
            let report = session.load(require_arg(args, 0, "load <histogram>")?)?;
            println!(
                "loaded {} sources ({} skipped), luminosity {} pb^-1",
                report.loaded.len(),
                report.skipped.len(),
                report.luminosity
            );
            for skip in &report.skipped {
                println!("  skipped {} ({}): {}", skip.source_id, skip.category, skip.reason);
            }
        }
        "rebin" => session.rebin(parse_rebin_spec(args)?)?,
        "cumulative" => session.cumulative()?,
        "ratio" => session.ratio()?,
        "set_x_range" => {
            let usage = "set_x_range <min> <max>";
            let lo = parse_f64(require_arg(args, 0, usage)?)?;
            let hi = parse_f64(require_arg(args, 1, usage)?)?;
            session.set_x_range(lo, hi)?;
        }
        "set_y_range" => {
            let usage = "set_y_range <min> <max>";
            let lo = parse_f64(require_arg(args, 0, usage)?)?;
            let hi = parse_f64(require_arg(args, 1, usage)?)?;
            session.set_y_range(lo, hi)?;
        }
        "set_log_y" => {
            session.set_switch("log_y", require_arg(args, 0, "set_log_y <on|off>")?)?;
        }
        "set" => {
            let usage = "set <switch> <value>";
            session.set_switch(require_arg(args, 0, usage)?, require_arg(args, 1, usage)?)?;
        }
        "legend" => {
            let min_bin_height = args.first().map(|a| parse_f64(a)).transpose()?;
            let columns = args.get(1).map(|a| parse_u32(a)).transpose()?;
            session.legend(min_bin_height, columns)?;
        }
        "x_title" => session.x_title(rest)?,
        "y_title" => session.y_title(rest)?,
        "annotation" => {
            let usage = "annotation <top|left|center|right> [text]";
            let position: AnnotationPosition = require_arg(args, 0, usage)?.parse()?;
            let extra = rest
                .split_once(char::is_whitespace)
                .map(|(_, r)| r.trim())
                .unwrap_or("");
            session.annotation(position, extra)?;
        }
        "reset" => {
            session.reset()?;
            println!("panel {} cleared", session.active_index());
        }
        "status" => print!("{}", session.status()),
        "save" => {
            let written = session.save(args.first().map(Path::new))?;
            println!("saved {}", written.display());
        }
        other => {
            return Err(Error::Validation(format!("unknown command '{other}'; type 'help'")))
        }
    }
    Ok(CommandOutcome::Continue)
}

/// The `setup` command only exists on the file-backed session, where the
/// configuration decides where histograms are read from.
pub fn dispatch_setup<A: RenderAdapter>(
    line: &str,
    session: &mut Session<JsonDirectorySource, A>,
) -> Option<CommandOutcome> {
    let (command, rest) = match line.trim().split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None => (line.trim(), ""),
    };
    if command != "setup" {
        return None;
    }
    let result = if rest.is_empty() {
        Err(Error::Validation("usage: setup <config.yaml>".into()))
    } else {
        session.setup(Path::new(rest)).map(|()| {
            println!("configuration loaded from {rest}");
        })
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
    }
    Some(CommandOutcome::Continue)
}

fn require_arg<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str> {
    args.get(index).copied().ok_or_else(|| Error::Validation(format!("usage: {usage}")))
}

fn parse_usize(token: &str) -> Result<usize> {
    token
        .parse()
        .map_err(|_| Error::Validation(format!("expected an integer, got '{token}'")))
}

fn parse_u32(token: &str) -> Result<u32> {
    token
        .parse()
        .map_err(|_| Error::Validation(format!("expected an integer, got '{token}'")))
}

fn parse_f64(token: &str) -> Result<f64> {
    token
        .parse()
        .map_err(|_| Error::Validation(format!("expected a number, got '{token}'")))
}

/// A single integer token is a merge factor; anything else is a list of
/// new bin edges, comma or space separated.
fn parse_rebin_spec(args: &[&str]) -> Result<RebinSpec> {
    if args.is_empty() {
        return Err(Error::Validation("usage: rebin <factor | edge,edge,...>".into()));
    }
    if args.len() == 1 && !args[0].contains(',') {
        if let Ok(factor) = args[0].parse::<usize>() {
            return Ok(RebinSpec::Factor(factor));
        }
    }
    let mut edges = Vec::new();
    for token in args.iter().flat_map(|a| a.split(',')) {
        let token = token.trim();
        if !token.is_empty() {
            edges.push(parse_f64(token)?);
        }
    }
    Ok(RebinSpec::Edges(edges))
}

fn print_help() {
    println!("commands:");
    println!("  setup <config.yaml>          load configuration and cross-sections");
    println!("  selection <name>             qualify histogram keys with a selection");
    println!(
        "  create_grid <cols> <rows>    build the panel grid (up to {MAX_GRID_COLS}x{MAX_GRID_ROWS})"
    );
    println!("  activate_panel <index>       switch the active panel (0-based)");
    println!("  load <histogram>             load, compose, and render on the active panel");
    println!("  rebin <factor|edges>         merge bins by factor or onto explicit edges");
    println!("  cumulative                   replace contents with tail integrals");
    println!("  ratio                        add the data over background ratio");
    println!("  set <switch> <value>         change a display switch, e.g. set log_y on");
    println!("  set_log_y <on|off>           shorthand for set log_y");
    println!("  set_x_range <min> <max>      restrict the visible x range");
    println!("  set_y_range <min> <max>      restrict the visible y range");
    println!("  legend [min_height] [cols]   tune legend filtering and layout");
    println!("  x_title <text>               set the x-axis title");
    println!("  y_title <text>               set the y-axis title (empty restores default)");
    println!("  annotation <pos> [text]      luminosity line plus experiment label");
    println!("  reset                        clear the active panel");
    println!("  status                       show grid, switches, and panel states");
    println!("  save [path]                  write the frame artifact (default plots/<name>.json)");
    println!("  exit                         leave the prompt");
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::{Histogram, Weighting};
    use sp_session::{MemorySource, PanelState, PlotConfig, XsecTable};

    fn test_session() -> Session<MemorySource, JsonFrameAdapter> {
        let config: PlotConfig = serde_yaml_ng_from(
            r#"
general:
  cross_sections: "xsec.yaml"
data:
  - name: data_obs
    luminosity: 1000.0
backgrounds:
  - name: qcd
    label: QCD
"#,
        );
        let xsec = XsecTable::from_entries([(
            "qcd".to_string(),
            Weighting { cross_section: 1.0, weight: 1.0, event_count: 1000 },
        )])
        .unwrap();
        let mut source = MemorySource::new();
        let hist = |content: Vec<f64>| {
            let error = vec![0.0; content.len()];
            Histogram::uniform("met", 4, 0.0, 4.0, content, error).unwrap()
        };
        source.insert("data_obs", "met", hist(vec![8.0, 6.0, 4.0, 2.0]));
        source.insert("qcd", "met", hist(vec![4.0, 3.0, 2.0, 1.0]));
        let mut session = Session::with_collaborators(source, JsonFrameAdapter::new());
        session.setup_with(config, xsec).unwrap();
        session
    }

    fn serde_yaml_ng_from(text: &str) -> PlotConfig {
        serde_yaml_ng::from_str(text).unwrap()
    }

    #[test]
    fn rebin_spec_distinguishes_factor_from_edges() {
        assert_eq!(parse_rebin_spec(&["2"]).unwrap(), RebinSpec::Factor(2));
        assert_eq!(
            parse_rebin_spec(&["0,50,100"]).unwrap(),
            RebinSpec::Edges(vec![0.0, 50.0, 100.0])
        );
        assert_eq!(
            parse_rebin_spec(&["0", "50", "100"]).unwrap(),
            RebinSpec::Edges(vec![0.0, 50.0, 100.0])
        );
        // A lone non-integer token falls through to the edge parser.
        assert_eq!(parse_rebin_spec(&["2.5"]).unwrap(), RebinSpec::Edges(vec![2.5]));
        assert!(parse_rebin_spec(&[]).is_err());
        assert!(parse_rebin_spec(&["0,fifty"]).is_err());
    }

    #[test]
    fn quit_and_unknown_commands() {
        let mut session = test_session();
        assert_eq!(dispatch("exit", &mut session), CommandOutcome::Quit);
        assert_eq!(dispatch("quit", &mut session), CommandOutcome::Quit);
        assert_eq!(dispatch("definitely_not_a_command", &mut session), CommandOutcome::Continue);
        assert_eq!(dispatch("", &mut session), CommandOutcome::Continue);
        assert_eq!(dispatch("# comment", &mut session), CommandOutcome::Continue);
    }

    #[test]
    fn command_sequence_drives_the_session() {
        let mut session = test_session();
        assert_eq!(dispatch("create_grid 2 1", &mut session), CommandOutcome::Continue);
        assert_eq!(session.grid(), (2, 1));
        dispatch("load met", &mut session);
        assert_eq!(session.panels()[0].state, PanelState::Rendered);
        dispatch("activate_panel 1", &mut session);
        assert_eq!(session.active_index(), 1);
        dispatch("activate_panel 0", &mut session);
        dispatch("set log_y on", &mut session);
        assert!(session.switches().log_y);
        dispatch("rebin 2", &mut session);
        let frame = session.adapter().frame(0).unwrap();
        assert_eq!(frame.bin_edges, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn failed_commands_leave_the_session_usable() {
        let mut session = test_session();
        // No grid yet; the error is reported and the prompt continues.
        assert_eq!(dispatch("load met", &mut session), CommandOutcome::Continue);
        assert_eq!(dispatch("create_grid 9 9", &mut session), CommandOutcome::Continue);
        assert_eq!(session.grid(), (0, 0));
        dispatch("create_grid 1 1", &mut session);
        dispatch("load met", &mut session);
        assert_eq!(session.panels()[0].state, PanelState::Rendered);
    }

    #[test]
    fn free_text_commands_keep_their_spacing() {
        let mut session = test_session();
        dispatch("create_grid 1 1", &mut session);
        dispatch("load met", &mut session);
        dispatch("x_title M_T  [GeV]", &mut session);
        let frame = session.adapter().frame(0).unwrap();
        assert_eq!(frame.x_title, "M_T  [GeV]");
    }
}
