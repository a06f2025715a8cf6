// Console front end for the re-calibration dashboard core.
//
// - Option [1] loads the configured export (or the sample data) and the
//   optional boundary overlay.
// - Option [2] sets the filter: mode, sub-district, market, year range.
// - Option [3] prints KPIs, instrument totals, markers and the selected
//   market's info card.
// - Option [4] exports the filtered rows and the marker GeoJSON.
use once_cell::sync::Lazy;
use pasar_tera::output::{self, category_rows, marker_rows, markers_geojson, preview_table_rows};
use pasar_tera::util::format_int;
use pasar_tera::{
    aggregate, apply_filter, clean_categories, default_year_range, kpis, load_records, market_info,
    market_options, markers, BoundaryOverlay, CategoryField, Config, FilterMode, FilterSelection,
    LoadOutcome, Selection,
};
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

// Session state: the loaded data plus the operator's current selection.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    data: Option<LoadOutcome>,
    boundary: Option<BoundaryOverlay>,
    selection: Option<FilterSelection>,
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// Let the operator pick one of `options`; `0` or an empty answer keeps
/// everything selected.
fn pick_option(title: &str, options: &[String]) -> Selection {
    println!("{}:", title);
    println!("  [0] (Semua)");
    for (i, opt) in options.iter().enumerate() {
        println!("  [{}] {}", i + 1, opt);
    }
    loop {
        let answer = prompt("Choice: ");
        if answer.is_empty() || answer == "0" {
            return Selection::All;
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Selection::Only(options[n - 1].clone()),
            _ => println!("Invalid choice. Enter a number between 0 and {}.", options.len()),
        }
    }
}

fn prompt_year(label: &str, default: i32) -> i32 {
    let answer = prompt(&format!("{} [{}]: ", label, default));
    answer.parse().unwrap_or(default)
}

fn handle_load(config: &Config) {
    let outcome = load_records(&config.data_path);
    println!(
        "Loaded {} market rows from {}.",
        format_int(outcome.records.len()),
        config.data_path.display()
    );
    if let Some(notice) = &outcome.diagnostic {
        println!("Notice: {}", notice);
    }

    let boundary = BoundaryOverlay::load(&config.boundary_path);
    if let Some(overlay) = &boundary {
        let labels = clean_categories(&outcome.records.records, CategoryField::SubDistrict);
        let matched = overlay
            .match_labels(&labels)
            .iter()
            .filter(|m| m.feature_name.is_some())
            .count();
        println!(
            "Boundary overlay: {} of {} sub-districts matched.",
            matched,
            labels.len()
        );
    } else {
        println!("Boundary overlay not available; map shows markers only.");
    }
    println!();

    let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    state.selection = Some(FilterSelection::all(default_year_range(&outcome.records)));
    state.data = Some(outcome);
    state.boundary = boundary;
}

fn handle_filter() {
    let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    let Some(data) = state.data.clone() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let records = &data.records.records;

    println!("Filter mode: [1] Sub-district then market  [2] Market directly");
    let mode = match prompt("Choice: ").as_str() {
        "2" => FilterMode::Direct,
        _ => FilterMode::Cascade,
    };

    let sub_district = match mode {
        FilterMode::Cascade => pick_option(
            "Sub-district",
            &clean_categories(records, CategoryField::SubDistrict),
        ),
        FilterMode::Direct => Selection::All,
    };
    let market = pick_option("Market", &market_options(records, mode, &sub_district));

    let (lo, hi) = default_year_range(&data.records);
    let from = prompt_year("Calibration year from", lo);
    let to = prompt_year("Calibration year to", hi);

    state.selection = Some(FilterSelection::for_mode(mode, (from, to), sub_district, market));
    println!();
}

fn handle_show(config: &Config) {
    let (data, selection, polygons) = {
        let state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
        (
            state.data.clone(),
            state.selection.clone(),
            state.boundary.as_ref().map(|b| b.feature_names().len()),
        )
    };
    let (Some(data), Some(selection)) = (data, selection) else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    if let Some(notice) = &data.diagnostic {
        println!("Notice: {}\n", notice);
    }

    let view = apply_filter(&data.records, &selection);
    let k = kpis(&data.records, &view);
    println!("Sub-districts: {}", format_int(k.sub_district_count));
    println!("Markets:       {}", format_int(k.market_count));
    match k.latest_year {
        Some(y) => println!("Latest tera:   {}", y),
        None => println!("Latest tera:   no data"),
    }
    println!("Total UTTP:    {}\n", format_int(k.instrument_total));

    println!("UTTP per type ({} markets)\n", format_int(view.len()));
    preview_table_rows(&category_rows(&aggregate(&view)), 7);

    let pins = markers(&view, config.current_year);
    if data.records.columns.coordinates {
        println!("Map markers ({} with coordinates)\n", format_int(pins.len()));
        preview_table_rows(&marker_rows(&pins), 10);
    } else {
        println!("Map markers: no coordinate data\n");
    }
    match polygons {
        Some(n) => println!("Boundary overlay: {} sub-district polygons\n", n),
        None => println!("Boundary overlay: omitted\n"),
    }

    if let Some(info) = market_info(&data.records, &selection.market_name) {
        println!("{}", info.market_name);
        println!("  Kecamatan: {}", info.sub_district);
        println!("  Alamat:    {}\n", info.address);
    }
}

fn handle_export(config: &Config) {
    let (data, selection) = {
        let state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
        (state.data.clone(), state.selection.clone())
    };
    let (Some(data), Some(selection)) = (data, selection) else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let view = apply_filter(&data.records, &selection);

    let file1 = "filtered_markets.csv";
    if let Err(e) = output::write_view_csv(file1, &view, &data.records.extra_columns) {
        eprintln!("Write error: {}", e);
    }
    let file2 = "markers.geojson";
    let pins = markers(&view, config.current_year);
    if let Err(e) = output::write_json(file2, &markers_geojson(&pins)) {
        eprintln!("Write error: {}", e);
    }
    println!("Exported {} rows to {} and {} markers to {}\n", view.len(), file1, pins.len(), file2);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env();
    loop {
        println!("Tera Ulang Dashboard");
        println!("[1] Load the file");
        println!("[2] Set filter");
        println!("[3] Show dashboard");
        println!("[4] Export");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(&config),
            "2" => handle_filter(),
            "3" => handle_show(&config),
            "4" => handle_export(&config),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-4.\n"),
        }
    }
}
