use super::*;

#[test]
fn stock_defaults_to_main_warehouse_and_pricelist() {
    let cli = Cli::try_parse_from(["stockpull", "stock"]).expect("expected valid cli args");

    let Commands::Stock(args) = cli.command else {
        panic!("expected stock command");
    };
    assert_eq!(PipelineRequest::from(args), PipelineRequest::default());
}

#[test]
fn parses_sheet_with_all_flags() {
    let cli = Cli::try_parse_from([
        "stockpull",
        "sheet",
        "--location",
        "12",
        "--pricelist",
        "3",
        "--category",
        "b",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Sheet(RunArgs {
            location: 12,
            pricelist: 3,
            category: CategorySelector::B,
        })
    ));
}

#[test]
fn category_is_case_insensitive() {
    let cli = Cli::try_parse_from(["stockpull", "stock", "--category", "A"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Stock(RunArgs {
            category: CategorySelector::A,
            ..
        })
    ));
}

#[test]
fn unknown_category_is_rejected() {
    assert!(Cli::try_parse_from(["stockpull", "stock", "--category", "c"]).is_err());
}

#[test]
fn non_numeric_location_is_rejected() {
    assert!(Cli::try_parse_from(["stockpull", "stock", "--location", "main"]).is_err());
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["stockpull"]).is_err());
}

#[test]
fn xlsx_defaults_output_file_name() {
    let cli = Cli::try_parse_from(["stockpull", "xlsx", "--category", "a"]).unwrap();
    let Commands::Xlsx(args) = cli.command else {
        panic!("expected xlsx command");
    };
    assert_eq!(args.output, PathBuf::from("pedido_stock.xlsx"));
    assert_eq!(args.run.category, CategorySelector::A);
}

#[test]
fn xlsx_accepts_output_path() {
    let cli = Cli::try_parse_from(["stockpull", "xlsx", "-o", "/tmp/order.xlsx", "--location", "4"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Xlsx(XlsxArgs {
            run: RunArgs { location: 4, .. },
            ref output,
        }) if output == &PathBuf::from("/tmp/order.xlsx")
    ));
}
