// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_job(sections: usize, items_per_section: usize) -> String {
    let mut content = String::from(
        "<JOB>\nTITLE: Senior Engineer\nCOMPANY: Acme\nREMOTE_TYPE: hybrid // ask about fridays\n\
            EMPLOYMENT_TYPE: FULL_TIME\n",
    );

    content.push_str("\n# REQUIRED_SKILLS\n");
    for i in 0..items_per_section {
        content.push_str(&format!("- Skill {i}\n"));
    }

    for section in 0..sections {
        content.push_str(&format!("\n# EXTRA_{section}\n"));
        content.push_str(&format!("OWNER: team {section}\n"));
        for i in 0..items_per_section {
            content.push_str(&format!("- Item {i} of section {section} // note\n"));
        }
    }

    content.push_str("</JOB>\n");
    content
}

#[allow(dead_code)]
pub fn generate_job_with_empty_sections(sections: usize) -> String {
    let mut content = String::from("<JOB>\nTITLE: Engineer\nCOMPANY: Acme\n");
    for section in 0..sections {
        content.push_str(&format!("# EMPTY_{section}\n\n"));
    }
    content.push_str("# REQUIRED_SKILLS\n- Go\n</JOB>\n");
    content
}
