//! Command-line construction for each terraform subcommand.
//!
//! Pure functions of [`RunOptions`]; nothing here touches the filesystem.

use idc_verify_core::types::RunOptions;

/// `terraform init` arguments.
pub fn init_args(options: &RunOptions) -> Vec<String> {
    let mut args = vec!["init".to_owned(), "-upgrade=false".to_owned()];
    push_color(&mut args, options);
    args
}

/// `terraform apply` arguments.
pub fn apply_args(options: &RunOptions) -> Vec<String> {
    let mut args = vec![
        "apply".to_owned(),
        "-input=false".to_owned(),
        "-auto-approve".to_owned(),
        format!("-lock={}", options.lock),
    ];
    push_color(&mut args, options);
    push_vars(&mut args, options);
    args
}

/// `terraform destroy` arguments.
pub fn destroy_args(options: &RunOptions) -> Vec<String> {
    let mut args = vec![
        "destroy".to_owned(),
        "-auto-approve".to_owned(),
        "-input=false".to_owned(),
        format!("-lock={}", options.lock),
    ];
    push_color(&mut args, options);
    push_vars(&mut args, options);
    args
}

/// `terraform output` arguments. Output is always read as uncolored JSON.
pub fn output_args(name: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "output".to_owned(),
        "-no-color".to_owned(),
        "-json".to_owned(),
    ];
    if let Some(name) = name {
        args.push(name.to_owned());
    }
    args
}

fn push_color(args: &mut Vec<String>, options: &RunOptions) {
    if !options.color {
        args.push("-no-color".to_owned());
    }
}

fn push_vars(args: &mut Vec<String>, options: &RunOptions) {
    for (key, value) in &options.vars {
        args.push("-var".to_owned());
        args.push(format!("{key}={value}"));
    }
    for file in &options.var_files {
        args.push(format!("-var-file={}", file.display()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RunOptions {
        RunOptions::new("../../examples/complete")
    }

    #[test]
    fn init_disables_upgrade_and_color() {
        assert_eq!(init_args(&options()), ["init", "-upgrade=false", "-no-color"]);
    }

    #[test]
    fn apply_uses_lock_and_auto_approve() {
        assert_eq!(
            apply_args(&options()),
            ["apply", "-input=false", "-auto-approve", "-lock=true", "-no-color"]
        );
    }

    #[test]
    fn apply_with_color_omits_no_color() {
        let mut opts = options();
        opts.color = true;
        opts.lock = false;
        assert_eq!(
            apply_args(&opts),
            ["apply", "-input=false", "-auto-approve", "-lock=false"]
        );
    }

    #[test]
    fn vars_are_emitted_in_key_order_before_var_files() {
        let mut opts = options()
            .with_var("region", "eu-central-1")
            .with_var("prefix", "acf");
        opts.var_files.push("common.tfvars".into());

        let args = destroy_args(&opts);
        let tail: Vec<&str> = args[5..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            [
                "-var",
                "prefix=acf",
                "-var",
                "region=eu-central-1",
                "-var-file=common.tfvars"
            ]
        );
    }

    #[test]
    fn destroy_starts_with_subcommand() {
        let args = destroy_args(&options());
        assert_eq!(args[0], "destroy");
        assert!(args.contains(&"-auto-approve".to_owned()));
        assert!(args.contains(&"-lock=true".to_owned()));
    }

    #[test]
    fn output_args_with_and_without_name() {
        assert_eq!(
            output_args(Some("idc_report")),
            ["output", "-no-color", "-json", "idc_report"]
        );
        assert_eq!(output_args(None), ["output", "-no-color", "-json"]);
    }
}
