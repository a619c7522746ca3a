//! End-to-end checks of the edit engine through the public API.

use stegra_core::edit::{apply_edits, apply_violation_fixes};
use stegra_core::source::construct::{enumerate, first_misplaced};
use stegra_core::source::extent::{block_braces, whole_line};
use stegra_core::{EditPlanner, Severity, SourceFile, Violation};

fn parse(text: &str) -> SourceFile {
    SourceFile::parse("main.tf", text).expect("valid HCL")
}

#[test]
fn moving_an_attribute_keeps_its_comment_and_reparses() {
    let text = "\
resource \"aws_instance\" \"web\" {
  # pinned for the migration
  depends_on = [aws_vpc.main]
  ami        = \"ami-123\"
}
";
    let file = parse(text);
    let block = file.body().blocks().next().unwrap();
    let constructs = enumerate(&file, &block.body);
    let braces = block_braces(&file, block).unwrap();

    let mut planner = EditPlanner::new(&file);
    let moved = planner.movable_range(constructs[0].range.clone());
    let anchor = planner.anchor_before_close(braces);
    planner.move_before(moved, anchor);
    let batch = planner.finish().unwrap();

    let fixed = apply_edits(text, &batch).unwrap();
    insta::assert_snapshot!(fixed, @r###"
    resource "aws_instance" "web" {
      ami        = "ami-123"
      # pinned for the migration
      depends_on = [aws_vpc.main]
    }
    "###);
    assert!(SourceFile::parse("main.tf", fixed).is_ok());
}

#[test]
fn members_first_move_preserves_all_bytes() {
    let text = "\
resource \"null_resource\" \"x\" {
  name     = \"a\"
  tags     = {}
  for_each = []
  other    = 1
}
";
    let file = parse(text);
    let block = file.body().blocks().next().unwrap();
    let constructs = enumerate(&file, &block.body);
    let misplaced =
        first_misplaced(&constructs, |c| c.is_attribute_named("for_each")).unwrap();

    let mut planner = EditPlanner::new(&file);
    let ranges: Vec<_> = misplaced
        .offenders
        .iter()
        .map(|&i| planner.movable_range(constructs[i].range.clone()))
        .collect();
    let anchor = planner.anchor_before(constructs[misplaced.anchor_member + 1].range.start);
    planner.move_all_before(&ranges, anchor);
    let fixed = apply_edits(text, &planner.finish().unwrap()).unwrap();

    assert_eq!(fixed.len(), text.len());
    insta::assert_snapshot!(fixed, @r###"
    resource "null_resource" "x" {
      for_each = []
      name     = "a"
      tags     = {}
      other    = 1
    }
    "###);
}

#[test]
fn whole_line_extent_of_last_line_without_newline() {
    let text = "a = 1\nb = 2";
    let file = parse(text);
    assert_eq!(file.slice(whole_line(&file, 6..11)), "b = 2");
}

#[test]
fn conflicting_violation_fixes_apply_on_separate_passes() {
    let text = "a = 1\n\n\n\nb = 2\n";
    let mut file = parse(text);
    let mut passes = 0;

    loop {
        let mut violations = Vec::new();
        // Every blank line after the first one in a run wants the whole run
        // collapsed, so the batches overlap and only one lands per pass.
        // The empty segment after the final newline is not a line.
        let last = file.lines().line_count() - 1;
        let blanks = file.trivia().blank_lines(1, last);
        if blanks.len() <= 1 {
            break;
        }
        for &line in &blanks[1..] {
            let mut planner = EditPlanner::new(&file);
            planner.delete_lines(blanks[1..].iter().copied());
            let batch = planner.finish().unwrap();
            violations.push(
                Violation::new(
                    "ST010",
                    "no-multiple-blank-lines",
                    Severity::Error,
                    file.location(file.lines().line_start(line)..file.lines().line_start(line)),
                    "multiple consecutive blank lines are not allowed",
                )
                .with_fix("collapse", batch),
            );
        }

        let (fixed, applied) = apply_violation_fixes(file.text(), &violations).unwrap();
        assert_eq!(applied, 1);
        file = parse(&fixed);
        passes += 1;
    }

    assert_eq!(passes, 1);
    assert_eq!(file.text(), "a = 1\n\nb = 2\n");
}
