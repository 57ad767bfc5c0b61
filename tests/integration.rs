use std::{cell::RefCell, rc::Rc, str::from_utf8};

use wallet_forms::{
    bin_utils::{Service, csv_parser::NameDirectory, session::ScriptError},
    form::{ConfirmError, FormConfig},
};

const EVENTS: &str = include_str!("events.csv");
const NAMES: &str = include_str!("names.csv");

#[test]
fn replay_events() {
    let mut output = Vec::new();
    let refused = Rc::new(RefCell::new(Vec::new()));
    let refused_sink = Rc::clone(&refused);

    let service = Service {
        input: EVENTS.as_bytes(),
        output: &mut output,
        names: NameDirectory::read(NAMES.as_bytes()).unwrap(),
        config: FormConfig::default(),
        error_printer: Box::new(move |line, err| match err {
            ScriptError::Confirm(err) => refused_sink.borrow_mut().push((line, err)),
            err => panic!("Unexpected error at line {line}: {err}"),
        }),
    };
    service.run().unwrap();

    let lines: Vec<&str> = from_utf8(&output).unwrap().lines().collect();
    assert_eq!(
        lines,
        vec![
            "form,receiver,amount,memo",
            "deposit,,1000,",
            "withdraw,,12.34,",
            "send,0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359,1.25,rent",
            "send,0xab5801a7d398351b8be11c439e05c5b3259aec9b,5.0000,rent",
        ]
    );

    let refused = refused.borrow();
    let lines: Vec<u64> = refused.iter().map(|(line, _)| *line).collect();
    assert_eq!(lines, vec![7, 16, 21, 28]);
    assert!(matches!(refused[2].1, ConfirmError::Resolving));
    assert!(matches!(refused[3].1, ConfirmError::Receiver(_)));
}
