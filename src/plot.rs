use super::VERSION;
use clap::{App, Arg};
use std::path::PathBuf;

/// Takes the CLI arguments that control the plotting of the workout log.
pub fn parse_cli() -> (PathBuf, PathBuf, Option<Vec<usize>>, bool) {
    let arg_csvin = Arg::with_name("input_file")
        .help("workout log csv file, semicolon separated")
        .index(1)
        .required(true);
    let arg_outdir = Arg::with_name("output_directory")
        .help("directory for the output png files, created if missing")
        .short("o")
        .long("outdir")
        .takes_value(true)
        .default_value("out");
    let arg_exercises = Arg::with_name("exercises")
        .help("indices of the exercises to plot, see --list; defaults to the four barbell lifts")
        .short("e")
        .long("exercises")
        .takes_value(true)
        .multiple(true);
    let arg_list = Arg::with_name("list")
        .help("list the exercises found in the csv file and exit")
        .short("l")
        .long("list")
        .takes_value(false);
    let cli_args = App::new("Workout_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot estimated 1RM and training volume from workout set logs")
        .arg(arg_csvin)
        .arg(arg_outdir)
        .arg(arg_exercises)
        .arg(arg_list)
        .get_matches();
    let csvin = PathBuf::from(cli_args.value_of("input_file").unwrap_or_default());
    let outdir = PathBuf::from(cli_args.value_of("output_directory").unwrap_or_default());
    let exercises = cli_args
        .values_of("exercises")
        .map(|vals| vals.map(|v| v.parse::<usize>().unwrap()).collect());
    let list = cli_args.is_present("list");
    return (csvin, outdir, exercises, list);
}
