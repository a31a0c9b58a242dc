//! Deterministic demo data.
//!
//! # Invariants
//! - Rerunning with the same seed creates nothing new: random draws happen
//!   whether or not a record already exists, so every run picks the same
//!   courses for the same student.
//! - Marks are added only to enrollments that have none.
//! - All writes of one run commit together.

use carpas_core::{
    service, with_transaction, Course, CourseDraft, MarkDraft, ServiceResult, Student,
    StudentDraft,
};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use serde::Serialize;

const STUDENT_COUNT: u32 = 20;
const COURSES_PER_STUDENT: usize = 4;
const TOTAL_CLASSES: i64 = 40;
const DEPARTMENT: &str = "CSE";
const SEMESTER: i64 = 3;

const LOW_ATTENDANCE_STUDENTS: &[&str] = &["DEMO-003", "DEMO-014"];
const LOW_ATTENDANCE_COURSES: &[&str] = &["CS302", "CS303"];
const LOW_MARKS_STUDENTS: &[&str] = &["DEMO-007", "DEMO-014"];
const LOW_MARKS_COURSES: &[&str] = &["MA301", "CS301"];

/// `(code, name, credits)`; every demo course runs in semester 3.
const DEMO_COURSES: &[(&str, &str, i64)] = &[
    ("CS301", "Data Structures & Algorithms", 4),
    ("CS302", "Database Management Systems", 4),
    ("CS303", "Operating Systems", 4),
    ("CS304", "Computer Networks", 4),
    ("MA301", "Discrete Mathematics", 3),
    ("HS301", "Professional Communication", 2),
];

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Aditya", "Ananya", "Ayesha", "Diya", "Ishaan", "Kavya", "Meera", "Neha", "Nikhil",
    "Priya", "Rahul", "Riya", "Rohit", "Sanya", "Shreya", "Siddharth", "Tanvi", "Varun", "Yash",
];

const LAST_NAMES: &[&str] = &[
    "Sharma", "Verma", "Gupta", "Singh", "Patel", "Mishra", "Jain", "Khan", "Yadav", "Joshi",
];

/// Records created (or attendance rows written) by one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedCounts {
    pub students_created: usize,
    pub courses_created: usize,
    pub enrollments_created: usize,
    pub attendance_set: usize,
    pub marks_created: usize,
}

/// Seeds demo courses, students, enrollments, attendance and marks.
pub fn seed_demo_data(conn: &mut Connection, rng_seed: u64) -> ServiceResult<SeedCounts> {
    let mut rng = StdRng::seed_from_u64(rng_seed);
    let counts = with_transaction(conn, |tx| seed_records(tx, &mut rng))?;
    info!(
        "event=seed module=cli status=ok rng_seed={} students_created={} courses_created={} enrollments_created={} attendance_set={} marks_created={}",
        rng_seed,
        counts.students_created,
        counts.courses_created,
        counts.enrollments_created,
        counts.attendance_set,
        counts.marks_created
    );
    Ok(counts)
}

fn seed_records(conn: &Connection, rng: &mut StdRng) -> ServiceResult<SeedCounts> {
    let mut counts = SeedCounts::default();
    let courses = seed_courses(conn, &mut counts)?;
    let students = seed_students(conn, rng, &mut counts)?;
    let enrollments = service::enrollments(conn);

    for student in &students {
        let chosen: Vec<&Course> = courses.choose_multiple(rng, COURSES_PER_STUDENT).collect();
        for course in chosen {
            let enrollment = match enrollments.find_enrollment(student.id, course.id)? {
                Some(existing) => existing,
                None => {
                    counts.enrollments_created += 1;
                    enrollments.enroll_student(student.id, course.id)?
                }
            };

            let low_attendance =
                forced(student, course, LOW_ATTENDANCE_STUDENTS, LOW_ATTENDANCE_COURSES);
            let attended = if low_attendance {
                rng.gen_range(10..=20)
            } else {
                rng.gen_range(24..=TOTAL_CLASSES)
            };
            enrollments.set_attendance(enrollment.id, TOTAL_CLASSES, attended)?;
            counts.attendance_set += 1;

            let low_marks = forced(student, course, LOW_MARKS_STUDENTS, LOW_MARKS_COURSES);
            let drafts = demo_marks(rng, low_marks);
            if enrollments.count_marks(enrollment.id)? == 0 {
                for draft in &drafts {
                    enrollments.add_mark(enrollment.id, draft)?;
                    counts.marks_created += 1;
                }
            }
        }
    }

    Ok(counts)
}

fn seed_courses(conn: &Connection, counts: &mut SeedCounts) -> ServiceResult<Vec<Course>> {
    let service = service::courses(conn);
    let mut courses = Vec::with_capacity(DEMO_COURSES.len());
    for &(code, name, credits) in DEMO_COURSES {
        let course = match service.find_course_by_code(code)? {
            Some(existing) => existing,
            None => {
                counts.courses_created += 1;
                service.create_course(
                    &CourseDraft::new(code, name)
                        .semester(SEMESTER)
                        .credits(credits),
                )?
            }
        };
        courses.push(course);
    }
    Ok(courses)
}

fn seed_students(
    conn: &Connection,
    rng: &mut StdRng,
    counts: &mut SeedCounts,
) -> ServiceResult<Vec<Student>> {
    let service = service::students(conn);
    let mut students = Vec::with_capacity(STUDENT_COUNT as usize);
    for index in 1..=STUDENT_COUNT {
        let roll_no = format!("DEMO-{index:03}");
        let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Demo");
        let last = LAST_NAMES.choose(rng).copied().unwrap_or("Student");
        let phone = format!("9{}", rng.gen_range(100_000_000..=999_999_999_u32));

        let student = match service.find_student_by_roll_no(&roll_no)? {
            Some(existing) => existing,
            None => {
                counts.students_created += 1;
                service.create_student(
                    &StudentDraft::new(roll_no, format!("{first} {last}"))
                        .department(DEPARTMENT)
                        .semester(SEMESTER)
                        .email(format!("demo{index:03}@example.com"))
                        .phone(phone),
                )?
            }
        };
        students.push(student);
    }
    Ok(students)
}

fn demo_marks(rng: &mut StdRng, low: bool) -> [MarkDraft; 3] {
    let (mid, assignment, end): (u8, u8, u8) = if low {
        (rng.gen_range(5..=12), rng.gen_range(2..=8), rng.gen_range(10..=18))
    } else {
        (rng.gen_range(10..=30), rng.gen_range(5..=20), rng.gen_range(15..=50))
    };
    [
        MarkDraft::new("Mid Sem", f64::from(mid), 30.0),
        MarkDraft::new("Assignment", f64::from(assignment), 20.0),
        MarkDraft::new("End Sem", f64::from(end), 50.0),
    ]
}

fn forced(student: &Student, course: &Course, students: &[&str], courses: &[&str]) -> bool {
    students.contains(&student.roll_no.as_str()) && courses.contains(&course.code.as_str())
}

#[cfg(test)]
mod tests {
    use super::{seed_demo_data, SeedCounts};
    use carpas_core::{open_db_in_memory, reset_store, service, student_enrollment_summaries};
    use rusqlite::Connection;

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn first_run_creates_full_demo_set() {
        let mut conn = open_db_in_memory().unwrap();
        let counts = seed_demo_data(&mut conn, 42).unwrap();

        assert_eq!(
            counts,
            SeedCounts {
                students_created: 20,
                courses_created: 6,
                enrollments_created: 80,
                attendance_set: 80,
                marks_created: 240,
            }
        );
        assert_eq!(count(&conn, "attendance"), 80);
    }

    #[test]
    fn rerun_with_same_seed_creates_nothing() {
        let mut conn = open_db_in_memory().unwrap();
        seed_demo_data(&mut conn, 42).unwrap();
        let counts = seed_demo_data(&mut conn, 42).unwrap();

        assert_eq!(counts.students_created, 0);
        assert_eq!(counts.courses_created, 0);
        assert_eq!(counts.enrollments_created, 0);
        assert_eq!(counts.marks_created, 0);
        assert_eq!(counts.attendance_set, 80);
        assert_eq!(count(&conn, "enrollments"), 80);
        assert_eq!(count(&conn, "marks"), 240);
    }

    #[test]
    fn reset_then_seed_starts_from_scratch() {
        let mut conn = open_db_in_memory().unwrap();
        seed_demo_data(&mut conn, 1).unwrap();
        reset_store(&mut conn).unwrap();
        assert_eq!(count(&conn, "students"), 0);

        let counts = seed_demo_data(&mut conn, 1).unwrap();
        assert_eq!(counts.students_created, 20);
    }

    #[test]
    fn forced_low_attendance_pairs_stay_below_threshold() {
        let mut conn = open_db_in_memory().unwrap();
        seed_demo_data(&mut conn, 42).unwrap();

        for roll_no in ["DEMO-003", "DEMO-014"] {
            let student = service::students(&conn)
                .find_student_by_roll_no(roll_no)
                .unwrap()
                .unwrap();
            for summary in student_enrollment_summaries(&conn, student.id).unwrap() {
                if ["CS302", "CS303"].contains(&summary.course_code.as_str()) {
                    assert!(summary.attendance_pct.unwrap() <= 50.0);
                }
            }
        }
    }
}
