// tests/pipeline_tests.rs
use std::io::Cursor;
use std::thread;

use logtint::{
    ColorTable, GroupKeyTable, LogProcessor, LogType, Painter, PipelineConfig, ProcessorConfig,
    Profile, StreamPipeline,
};

const LEVEL_TAG: &str = r"(?P<level>[A-Z])/(?P<tag>[^:]*): (?P<message>.*)";

fn plain(config: ProcessorConfig) -> LogProcessor {
    let mut processor = LogProcessor::new(config, ColorTable::new(), GroupKeyTable::new());
    processor.setup_regex_parser(LEVEL_TAG).unwrap();
    processor
}

fn run(processor: LogProcessor, input: &str) -> String {
    let mut pipeline = StreamPipeline::new(PipelineConfig::default(), Box::new(processor));
    let mut output = Vec::new();
    pipeline
        .process_stream(Cursor::new(input.to_string()), &mut output, None)
        .unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn test_plain_columns() {
    println!("=== Testing column layout without colors ===");

    let output = run(
        plain(ProcessorConfig::default()),
        "D/MyTag: hello world\nI/ActivityManager: Start proc\n",
    );
    println!("Output:\n{}", output);

    let expected = format!(
        " D  {:>23} hello world\n I  {:>23} Start proc\n",
        "MyTag", "ActivityManager"
    );
    assert_eq!(output, expected);
}

#[test]
fn test_descriptor_pattern() {
    println!("=== Testing okcat-style pattern descriptor ===");

    let mut processor =
        LogProcessor::new(ProcessorConfig::default(), ColorTable::new(), GroupKeyTable::new());
    processor
        .setup_regex_parser(r#"date,time,level,tag,message = "(\S+) (\S+) ([A-Z]) ([^:]*): (.*)""#)
        .unwrap();

    let output = run(processor, "12-28 19:01:14.073 W Netd: link down\n");
    assert_eq!(
        output,
        format!(
            "12-28 {:>16}  W  {:>23} link down\n",
            "19:01:14.073", "Netd"
        )
    );
}

#[test]
fn test_continuation_lines_follow_their_header() {
    println!("=== Testing continuation lines inherit the filter verdict ===");

    let mut processor = plain(ProcessorConfig::default());
    processor
        .setup_condition(["MyTag"], Vec::<String>::new())
        .unwrap();

    let input = "E/MyTag: boom\n\tat Foo.bar\nE/Other: noise\n\tat Baz.qux\n";
    let output = run(processor, input);
    println!("Output:\n{}", output);

    assert!(output.contains("boom"));
    assert!(output.contains("at Foo.bar"));
    assert!(!output.contains("noise"));
    assert!(!output.contains("Baz.qux"));
}

#[test]
fn test_line_keywords_override_tag_filter() {
    println!("=== Testing line keywords pull in lines from other tags ===");

    let mut processor = plain(ProcessorConfig::default());
    processor.setup_condition(["MyTag"], ["crash"]).unwrap();

    let output = run(
        processor,
        "I/MyTag: ok\nI/Other: quiet\nE/Other: crash in worker\n",
    );
    assert!(output.contains("ok"));
    assert!(!output.contains("quiet"));
    assert!(output.contains("crash in worker"));
}

#[test]
fn test_notime_mode_matches_tag_keywords_against_message() {
    println!("=== Testing notime mode ===");

    let config = ProcessorConfig {
        log_type: LogType::NoTime,
        ..ProcessorConfig::default()
    };
    let mut processor = plain(config);
    processor
        .setup_condition(["payment"], Vec::<String>::new())
        .unwrap();

    let output = run(processor, "I/Shop: payment accepted\nI/Shop: cart updated\n");
    assert!(output.contains("payment accepted"));
    assert!(!output.contains("cart updated"));
}

#[test]
fn test_hide_same_tags() {
    println!("=== Testing repeated tags are blanked ===");

    let config = ProcessorConfig {
        hide_same_tags: true,
        ..ProcessorConfig::default()
    };
    let output = run(plain(config), "I/Net: one\nI/Net: two\nI/Db: three\n");
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines[0], format!(" I  {:>23} one", "Net"));
    assert_eq!(lines[1], format!(" I  {} two", " ".repeat(23)));
    assert_eq!(lines[2], format!(" I  {:>23} three", "Db"));
}

#[test]
fn test_no_pattern_prints_nothing() {
    println!("=== Testing processor without a line pattern ===");

    let processor =
        LogProcessor::new(ProcessorConfig::default(), ColorTable::new(), GroupKeyTable::new());
    assert_eq!(run(processor, "D/MyTag: hello\nplain text\n"), "");
}

#[test]
fn test_blank_lines_are_dropped() {
    let output = run(plain(ProcessorConfig::default()), "\n   \nI/Tag: x\n\n");
    assert_eq!(output.lines().count(), 1);
}

#[test]
fn test_separator_banner_on_group_change() {
    println!("=== Testing group separator banners ===");

    let mut processor = plain(ProcessorConfig::default());
    processor.setup_separator([r"session=(\w+)"]).unwrap();

    let config = PipelineConfig {
        banner_width: 20,
        ..PipelineConfig::default()
    };
    let mut pipeline = StreamPipeline::new(config, Box::new(processor));
    let input = "I/A: session=alpha start\nI/A: session=alpha step\nI/A: untracked\nI/A: session=beta start\n";
    let mut output = Vec::new();
    let stats = pipeline
        .process_stream(Cursor::new(input), &mut output, None)
        .unwrap();
    let output = String::from_utf8(output).unwrap();
    println!("Output:\n{}", output);

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "====== alpha =======");
    assert!(lines[1].ends_with("session=alpha start"));
    assert!(lines[2].ends_with("session=alpha step"));
    assert!(lines[3].ends_with("untracked"));
    assert_eq!(lines[4], "======= beta =======");
    assert_eq!(stats.separators_written, 2);
}

#[test]
fn test_profile_applied_to_processor() {
    println!("=== Testing profile rules end to end ===");

    let profile = Profile::from_yaml_str(
        r#"
log-line-regex: 'level,tag,message = "([A-Z])/([^:]*): (.*)"'
trans-msg-map:
  'conn=': 'connection '
hide-msg-list: ['heartbeat']
tag-keywords: ['Net']
"#,
    )
    .unwrap();

    let mut processor =
        LogProcessor::new(ProcessorConfig::default(), ColorTable::new(), GroupKeyTable::new());
    profile.apply(&mut processor).unwrap();

    let output = run(
        processor,
        "I/Net: conn=open\nI/Net: heartbeat 5\nI/Ui: draw\n",
    );
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("connection open"));
    assert_eq!(lines[1], format!(" I  {:>23} ", "Net"));
}

#[test]
fn test_colors_shared_across_threads() {
    println!("=== Testing tag colors are stable across concurrent streams ===");

    let colors = ColorTable::new();
    let config = ProcessorConfig {
        use_colors: true,
        ..ProcessorConfig::default()
    };
    let mut base = LogProcessor::new(config, colors.clone(), GroupKeyTable::new());
    base.setup_regex_parser(LEVEL_TAG).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let mut processor = base.fork();
            thread::spawn(move || {
                (0..50)
                    .filter_map(|i| {
                        let line = format!("I/Tag{}: message {}", i % 5, i);
                        processor.process(line.as_bytes()).line
                    })
                    .collect::<Vec<String>>()
            })
        })
        .collect();

    let outputs: Vec<Vec<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(colors.len(), 5);
    for i in 0..5 {
        let tag = format!("Tag{}", i);
        let painted = Painter::new(true).render(&tag, Some(colors.color_for(&tag)), None);
        for output in &outputs {
            assert!(output[i].contains(&painted));
        }
    }
    // Every stream produced identical lines
    assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));
}
