//! Built-in command table
//!
//! Every built-in is a [`Builtin`] variant; names resolve through
//! [`BUILTINS`], which also carries the help text.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Pwd,
    Cd,
    Exit,
    Jobs,
    Fg,
    Bg,
    WaitFor,
    WaitAll,
    Help,
}

pub struct BuiltinSpec {
    pub name: &'static str,
    pub builtin: Builtin,
    pub summary: &'static str,
    pub usage: &'static str,
}

pub const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: "bg",
        builtin: Builtin::Bg,
        summary: "Resume a job in the background",
        usage: "bg INDEX",
    },
    BuiltinSpec {
        name: "cd",
        builtin: Builtin::Cd,
        summary: "Change the current directory",
        usage: "cd [DIR]",
    },
    BuiltinSpec {
        name: "exit",
        builtin: Builtin::Exit,
        summary: "Exit the shell",
        usage: "exit",
    },
    BuiltinSpec {
        name: "fg",
        builtin: Builtin::Fg,
        summary: "Resume a job in the foreground",
        usage: "fg INDEX",
    },
    BuiltinSpec {
        name: "help",
        builtin: Builtin::Help,
        summary: "Show help for built-in commands",
        usage: "help [COMMAND]",
    },
    BuiltinSpec {
        name: "jobs",
        builtin: Builtin::Jobs,
        summary: "List background and stopped jobs",
        usage: "jobs",
    },
    BuiltinSpec {
        name: "pwd",
        builtin: Builtin::Pwd,
        summary: "Print the current directory",
        usage: "pwd",
    },
    BuiltinSpec {
        name: "wait-all",
        builtin: Builtin::WaitAll,
        summary: "Wait until every background job exits or stops",
        usage: "wait-all",
    },
    BuiltinSpec {
        name: "wait-for",
        builtin: Builtin::WaitFor,
        summary: "Wait until a background job exits or stops",
        usage: "wait-for INDEX",
    },
];

pub fn lookup(name: &str) -> Option<&'static BuiltinSpec> {
    BUILTINS.iter().find(|b| b.name == name)
}

pub fn format_help(spec: &BuiltinSpec) -> String {
    format!("{} - {}\n\nUsage: {}\n", spec.name, spec.summary, spec.usage)
}

pub fn format_help_list() -> String {
    let mut out = String::new();
    out.push_str("swish - built-in commands\n\n");

    for spec in BUILTINS {
        out.push_str(&format!("  {:12} {}\n", spec.name, spec.summary));
    }

    out.push_str("\nAnything else runs as a program: CMD [ARGS] [< FILE] [> FILE | >> FILE] [&]\n");
    out
}

pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_one_entry() {
        let all = [
            Builtin::Pwd,
            Builtin::Cd,
            Builtin::Exit,
            Builtin::Jobs,
            Builtin::Fg,
            Builtin::Bg,
            Builtin::WaitFor,
            Builtin::WaitAll,
            Builtin::Help,
        ];
        for builtin in all {
            assert_eq!(
                BUILTINS.iter().filter(|b| b.builtin == builtin).count(),
                1,
                "{builtin:?}"
            );
        }
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(lookup("wait-for").unwrap().builtin, Builtin::WaitFor);
        assert_eq!(lookup("fg").unwrap().builtin, Builtin::Fg);
        assert!(lookup("ls").is_none());
        assert!(lookup("FG").is_none());
    }

    #[test]
    fn help_list_names_everything() {
        let list = format_help_list();
        for spec in BUILTINS {
            assert!(list.contains(spec.name));
        }
    }

    #[test]
    fn wants_help_flags() {
        assert!(wants_help(&["--help".to_string()]));
        assert!(wants_help(&["-h".to_string()]));
        assert!(!wants_help(&["0".to_string()]));
    }
}
