//! Integration tests for table compilation and queries

use inline_table::{compile, compile_with, Bindings, TableError, Value};

// ============================================================================
// Dialect Tests - the same logical table in every markup
// ============================================================================

mod dialects {
    use super::*;

    fn check(table: &inline_table::Table) {
        let row = table.select(&[("A", Value::Int(2))]).unwrap();
        assert_eq!(row.get("B"), Some(&Value::from("two")));
    }

    #[test]
    fn test_simple_table() {
        let t = compile(
            "
            === =====
             A   B
            === =====
             1  'one'
             2  'two'
            === =====
            ",
        )
        .unwrap();
        check(&t);
    }

    #[test]
    fn test_grid_table() {
        let t = compile(
            "
            +-----+-------+
            |  A  |  B    |
            +=====+=======+
            |  1  | 'one' |
            +-----+-------+
            |  2  | 'two' |
            +-----+-------+
            ",
        )
        .unwrap();
        check(&t);
    }

    #[test]
    fn test_markdown_table() {
        let t = compile(
            "
            | A | B     |
            |---|-------|
            | 1 | 'one' |
            | 2 | 'two' |
            ",
        )
        .unwrap();
        check(&t);
    }

    #[test]
    fn test_grid_table_with_kind_on_second_header_line() {
        let t = compile(
            "
            +--------+--------+
            |  age   | call   |
            | (cond) | (str)  |
            +========+========+
            | a < 18 | kid    |
            | *      | adult  |
            +--------+--------+
            ",
        )
        .unwrap();
        let row = t.select(&[("age", Value::Int(10))]).unwrap();
        assert_eq!(row.get("call"), Some(&Value::from("kid")));
    }

    #[test]
    fn test_unknown_format() {
        let err = compile("once upon a time\nthere was no table").unwrap_err();
        assert!(matches!(err, TableError::Markup { .. }));
    }

    #[test]
    fn test_too_few_rows() {
        let err = compile(
            "
            | A | B |
            |---|---|
            ",
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Markup { .. }));
    }

    #[test]
    fn test_ragged_markdown_table() {
        let err = compile(
            "
            | A | B |
            |---|---|
            | 1 | 2 | 3 |
            ",
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Markup { .. }));
    }
}

// ============================================================================
// Scenario Tests - the documented end-to-end behaviors
// ============================================================================

mod scenarios {
    use super::*;

    /// Scenario 1: condition + value + string columns
    #[test]
    fn test_age_gender_call() {
        let t = compile(
            "
            ========== ======== ==========
            age(cond)  gender   call(str)
            ========== ======== ==========
            a < 18     *        kid
            a >= 18    'male'   gentleman
            a >= 18    'female' lady
            ========== ======== ==========
            ",
        )
        .unwrap();
        let row = t
            .select(&[("age", Value::Int(24)), ("gender", "female".into())])
            .unwrap();
        assert_eq!(
            row.to_string(),
            "(age=24, gender='female', call='lady')"
        );
    }

    /// Scenario 2: N/A fails the first otherwise-matching row, wildcard
    /// rows still serve other queries
    #[test]
    fn test_na_and_wildcard_precedence() {
        let t = compile(
            "
            === ===
             K   V
            === ===
             1  N/A
             *   1
            === ===
            ",
        )
        .unwrap();

        let row = t.select(&[("K", Value::Int(2))]).unwrap();
        assert_eq!(row.get("K"), Some(&Value::Int(2)));
        assert_eq!(row.get("V"), Some(&Value::Int(1)));

        let err = t.select(&[("K", Value::Int(1))]).unwrap_err();
        assert!(matches!(err, TableError::NotApplicable { .. }));
    }

    /// Scenario 3: all four column kinds in one table
    #[test]
    fn test_all_column_kinds() {
        let t = compile(
            "
            ========= ========= ======== ==========
            V(value)  C(cond)   S(str)   R(regex)
            ========= ========= ======== ==========
            1         c < 0     abc      '[0-9]+'
            2         c >= 0    def      '[a-z]+'
            ========= ========= ======== ==========
            ",
        )
        .unwrap();
        let row = t
            .select(&[("C", Value::Int(-1)), ("R", "012".into())])
            .unwrap();
        assert_eq!(row.get("V"), Some(&Value::Int(1)));
        assert_eq!(row.get("C"), Some(&Value::Int(-1)));
        assert_eq!(row.get("S"), Some(&Value::from("abc")));
        assert_eq!(row.get("R"), Some(&Value::from("012")));
    }

    /// Scenario 4: union concatenates rows preserving order
    #[test]
    fn test_union_queries_both_sources() {
        let a = compile(
            "
            ===== =====
            key   value
            ===== =====
            'A'    1
            ===== =====
            ",
        )
        .unwrap();
        let b = compile(
            "
            ===== =====
            key   value
            ===== =====
            'B'    2
            ===== =====
            ",
        )
        .unwrap();
        let u = a.union(&b).unwrap();
        assert_eq!(u.len(), 2);
        assert!(u.contains(&[("key", "A".into())]));
        assert!(u.contains(&[("key", "B".into())]));
    }

    /// Scenario 5: join on a shared label, schema errors on missing labels
    #[test]
    fn test_join_on_shared_label() {
        let phone = compile(
            "
            ====== ==========
            name   phone
            ====== ==========
            'ann'  '555-0001'
            'bob'  '555-0002'
            ====== ==========
            ",
        )
        .unwrap();
        let city = compile(
            "
            ====== ========
            name   city
            ====== ========
            'ann'  'berlin'
            'eve'  'oslo'
            ====== ========
            ",
        )
        .unwrap();

        let joined = phone.join(&city, &["name"]).unwrap();
        assert_eq!(joined.len(), 1);
        let row = joined.get(0).unwrap();
        assert_eq!(row.get("phone"), Some(&Value::from("555-0001")));
        assert_eq!(row.get("city"), Some(&Value::from("berlin")));

        let err = phone.join(&city, &["phone"]).unwrap_err();
        assert!(matches!(err, TableError::SchemaMismatch { .. }));
    }
}

// ============================================================================
// Matching Semantics Tests
// ============================================================================

mod semantics {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let t = compile(
            "
            ========= =====
            age(cond) tier
            ========= =====
            a < 10    'a'
            a < 100   'b'
            ========= =====
            ",
        )
        .unwrap();
        let row = t.select(&[("age", Value::Int(5))]).unwrap();
        assert_eq!(row.get("tier"), Some(&Value::from("a")));
    }

    #[test]
    fn test_select_agrees_with_select_all() {
        let t = compile(
            "
            ========= =====
            age(cond) tier
            ========= =====
            a < 10    'a'
            a < 100   'b'
            ========= =====
            ",
        )
        .unwrap();
        let query = [("age", Value::Int(5))];
        let all = t.select_all(&query).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(t.select(&query).unwrap(), all[0]);
    }

    #[test]
    fn test_unconstrained_columns_are_implicit_wildcards() {
        let t = compile(
            "
            === ===
             A   B
            === ===
             1   2
            === ===
            ",
        )
        .unwrap();
        // No constraints at all: the first row matches
        let row = t.select(&[]).unwrap();
        assert_eq!(row.get("A"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_wildcard_only_column_is_query_independent() {
        let t = compile(
            "
            === ===
             A   B
            === ===
             *   1
             *   2
            === ===
            ",
        )
        .unwrap();
        for x in [-3i64, 0, 1000] {
            let row = t.select(&[("A", Value::Int(x))]).unwrap();
            assert_eq!(row.get("B"), Some(&Value::Int(1)));
        }
    }

    #[test]
    fn test_string_column_markers_are_literal() {
        let t = compile(
            "
            ======== ===
            key(str)  V
            ======== ===
            *          1
            N/A        2
            x          3
            ======== ===
            ",
        )
        .unwrap();
        let star = t.select(&[("key", "*".into())]).unwrap();
        assert_eq!(star.get("V"), Some(&Value::Int(1)));
        let na = t.select(&[("key", "N/A".into())]).unwrap();
        assert_eq!(na.get("V"), Some(&Value::Int(2)));
        // And neither acts as a wildcard
        let err = t.select(&[("key", "y".into())]).unwrap_err();
        assert!(matches!(err, TableError::NoMatch { .. }));
    }

    #[test]
    fn test_regex_requires_full_match() {
        let t = compile(
            "
            ========= ===
            id(regex)  V
            ========= ===
            '[0-9]+'   1
            ========= ===
            ",
        )
        .unwrap();
        assert!(t.contains(&[("id", "42".into())]));
        assert!(!t.contains(&[("id", "x42".into())]));
        assert!(!t.contains(&[("id", "42x".into())]));
    }

    #[test]
    fn test_iterator_yields_all_rows_and_restarts() {
        let t = compile(
            "
            === ===
             A   B
            === ===
             1   2
             2  N/A
             *   0
            === ===
            ",
        )
        .unwrap();
        assert_eq!(t.iter().count(), 3);
        let rows: Vec<_> = t.iter().collect();
        assert_eq!(rows[1].get("B"), Some(&Value::from("N/A")));
        assert_eq!(rows[2].get("A"), Some(&Value::from("*")));
        // for-loop syntax via IntoIterator
        let mut n = 0;
        for _row in &t {
            n += 1;
        }
        assert_eq!(n, 3);
    }

    #[test]
    fn test_query_error_on_unknown_label() {
        let t = compile(
            "
            === ===
             A   B
            === ===
             1   2
            === ===
            ",
        )
        .unwrap();
        let err = t.select(&[("C", Value::Int(1))]).unwrap_err();
        assert!(matches!(err, TableError::Query { .. }));
        let err = t.select_all(&[("C", Value::Int(1))]).unwrap_err();
        assert!(matches!(err, TableError::Query { .. }));
    }
}

// ============================================================================
// Compilation Tests - literals, bindings and diagnostics
// ============================================================================

mod compilation {
    use super::*;

    #[test]
    fn test_value_cells_fold_arithmetic() {
        let t = compile(
            "
            === === ========
             a   b   aplusb
            === === ========
             1   1   1 + 1
            === === ========
            ",
        )
        .unwrap();
        let row = t
            .select(&[("a", Value::Int(1)), ("b", Value::Int(1))])
            .unwrap();
        assert_eq!(row.get("aplusb"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_bindings_substitute_into_cells() {
        let bindings = Bindings::new().set("M", "male").set("adult", 18);
        let t = compile_with(
            "
            ============= ======== =====
            age(cond)     gender   code
            ============= ======== =====
            a >= adult    M         1
            a >= adult    'female'  2
            *             *         0
            ============= ======== =====
            ",
            &bindings,
        )
        .unwrap();
        let row = t
            .select(&[("age", Value::Int(30)), ("gender", "male".into())])
            .unwrap();
        assert_eq!(row.get("code"), Some(&Value::Int(1)));
        let row = t
            .select(&[("age", Value::Int(3)), ("gender", "male".into())])
            .unwrap();
        assert_eq!(row.get("code"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_unresolved_name_is_compile_error() {
        let err = compile(
            "
            =====
             A
            =====
            table
            =====
            ",
        )
        .unwrap_err();
        match err {
            TableError::UnknownName { name, .. } => assert_eq!(name, "table"),
            other => panic!("expected UnknownName, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_cell_reports_coordinates() {
        let err = compile(
            "
            === ===
             A   B
            === ===
             1   2
             3   ((
            === ===
            ",
        )
        .unwrap_err();
        match err {
            TableError::Markup { row, col, .. } => {
                assert_eq!(row, Some(1));
                assert_eq!(col, Some(1));
            }
            other => panic!("expected Markup, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_header_keyword() {
        let err = compile(
            "
            ========= ===
            A(fuzzy)   B
            ========= ===
            1          2
            ========= ===
            ",
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown column keyword"));
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let err = compile(
            "
            === ===
             A   A
            === ===
             1   2
            === ===
            ",
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_recompilation_is_idempotent() {
        let text = "
            ========== =====
            age(cond)  call
            ========== =====
            a < 18     'kid'
            *          'adult'
            ========== =====
            ";
        let t1 = compile(text).unwrap();
        let t2 = compile(text).unwrap();
        for q in [
            [("age", Value::Int(3))],
            [("age", Value::Int(30))],
        ] {
            assert_eq!(t1.select(&q).unwrap(), t2.select(&q).unwrap());
        }
    }
}

// ============================================================================
// Concurrency Tests - a published table is freely shareable
// ============================================================================

mod sharing {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_reads() {
        let t = Arc::new(
            compile(
                "
                ========= =====
                age(cond) tier
                ========= =====
                a < 10    'a'
                *         'b'
                ========= =====
                ",
            )
            .unwrap(),
        );

        let handles: Vec<_> = (0..4i64)
            .map(|i| {
                let t = Arc::clone(&t);
                thread::spawn(move || {
                    let row = t.select(&[("age", Value::Int(i))]).unwrap();
                    assert_eq!(row.get("tier"), Some(&Value::from("a")));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
