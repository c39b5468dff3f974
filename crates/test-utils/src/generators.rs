//! Synthetic suite generators for benchmarks and scale tests.

use std::fmt::Write;

/// Build a STASHmaster record block for one (section, item).
pub fn stashmaster_record(section: u16, item: u16, grid: &str, packing_code: &str) -> String {
    format!(
        "1|    1 | {:>4} | {:>4} |SYNTHETIC FIELD {:02}/{:03}             |\n\
         2|    0 |    0 |    1 | {:>4} |    5 |   -1 |   -1 |    0 |    0 |    0 |    0 |\n\
         3| 000000000000000000000000000000 | 00000000000000000001 |    1 |\n\
         4|    1 |    0 | -3  -3  -3  -3 {:>3}  21 -99 -99 -99 -99 |\n\
         5|    0 |    0 |    0 |  129 |    0 |    0 |    0 |    0 |    0 |\n",
        section, item, section, item, grid, packing_code
    )
}

/// A STASHmaster file containing `sections x items` synthetic records.
pub fn generate_stashmaster(sections: u16, items: u16) -> String {
    let mut out = String::from("H1| SUBMODEL_NUMBER=1\n");
    for section in 0..sections {
        for item in 1..=items {
            let grid = if item % 7 == 0 { "23" } else { "1" };
            let packing = if item % 5 == 0 { "-99" } else { "-3" };
            out.push_str(&stashmaster_record(section, item, grid, packing));
        }
    }
    out
}

/// A suite configuration with `requests` diagnostic requests spread over
/// four streams and one meaning file.
///
/// Requests cycle through `sections x items`, so pair it with
/// [`generate_stashmaster`] using the same dimensions.
pub fn generate_suite_config(requests: usize, sections: u16, items: u16) -> String {
    let mut out = String::new();
    out.push_str(
        "[namelist:nlsizes]\nglobal_row_length=432\nglobal_rows=324\n\n\
         [namelist:run_dyn]\nl_endgame=.true.\n\n\
         [namelist:nlstcgen]\ndump_frequency_units=2\ndumpfreqim=10\n\
         l_meaning_sequence=.true.\nmeanfreqim=3,3,4,10\nppselectim=1,1,1,1\n\
         mean_1_filename_base='a.pm'\nmean_2_filename_base='a.ps'\n\
         mean_3_filename_base='a.py'\nmean_4_filename_base='a.px'\n\
         secs_per_periodim=86400\nsteps_per_periodim=72\n\n",
    );

    let usages = ["UPA", "UPB", "UPC", "UPD"];
    for (index, usage) in usages.iter().enumerate() {
        let stream = index + 1;
        let _ = write!(
            out,
            "[namelist:nlstcall_pp(pp{stream})]\nreinit_step={step}\nreinit_unit={unit}\nreserved_headers=0\n\n\
             [namelist:use(u{stream})]\nfile_id='pp{stream}'\nlocn=3\nuse_name='{usage}'\n\n",
            stream = stream,
            step = if stream % 2 == 0 { 6 } else { 1 },
            unit = if stream % 2 == 0 { 1 } else { 4 },
            usage = usage,
        );
    }
    out.push_str("[namelist:use(umean)]\nlocn=2\nmacrotag=1\nuse_name='UPMEAN'\n\n");

    out.push_str(
        "[namelist:domain(d1)]\ndom_name='DIAG'\nimn=0\niopa=1\niopl=5\n\n\
         [namelist:domain(d2)]\ndom_name='DALLTH'\nimn=0\niopa=1\niopl=2\nlevb=1\nlevt=70\n\n\
         [namelist:domain(d3)]\ndom_name='DZMN'\nimn=2\niopa=1\niopl=3\nrlevlst=850.0,500.0\n\n\
         [namelist:time(t1)]\nifre=1\niopt=1\nityp=1\ntim_name='T6H'\nunt3=2\n\n\
         [namelist:time(t2)]\nifre=1\niopt=1\nityp=3\ntim_name='TDAYM'\nunt3=3\n\n\
         [namelist:time(t3)]\nifre=30\niopt=1\nityp=3\ntim_name='TMONMN'\nunt3=3\n\n",
    );

    let domains = ["DIAG", "DALLTH", "DZMN"];
    let times = ["T6H", "TDAYM", "TMONMN"];
    let all_usages = ["UPA", "UPB", "UPC", "UPD", "UPMEAN"];
    let codes = usize::from(sections.max(1)) * usize::from(items.max(1));
    for n in 0..requests {
        let code = n % codes;
        let section = code / usize::from(items.max(1));
        let item = code % usize::from(items.max(1)) + 1;
        let _ = write!(
            out,
            "[namelist:streq(r{n})]\ndom_name='{dom}'\nisec={section}\nitem={item}\ntim_name='{tim}'\nuse_name='{usage}'\n\n",
            n = n,
            dom = domains[n % domains.len()],
            section = section,
            item = item,
            tim = times[(n / domains.len()) % times.len()],
            usage = all_usages[n % all_usages.len()],
        );
    }
    out
}
